use notebase::{
    auth::Caller,
    error::{EntityKind, WorkspaceError},
    render::Layout,
    store::WorkspaceDatabase,
    workspace::{
        ColumnDefinition, ColumnType, FieldValue, Fields, SelectOption, ViewConfig, ViewPatch,
        ViewType, WorkspaceService, WorkspaceStorage,
    },
};

async fn service() -> WorkspaceService {
    let database = WorkspaceDatabase::in_memory().await.unwrap();
    WorkspaceService::new(WorkspaceStorage::new(database.pool()))
}

fn status_schema() -> Vec<ColumnDefinition> {
    vec![ColumnDefinition::new("Status", ColumnType::Status).with_options(vec![SelectOption {
        label: "Done".into(),
        color: "#00FF00".into(),
    }])]
}

fn fields(entries: &[(&str, FieldValue)]) -> Fields {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn is_denied(err: &WorkspaceError, expected: EntityKind) -> bool {
    matches!(err, WorkspaceError::NotFoundOrAccessDenied { kind } if *kind == expected)
}

#[tokio::test]
async fn create_database_adds_default_table_view() {
    let service = service().await;
    let alice = Caller::user("alice");

    let page_id = service
        .create_database(&alice, "Tasks", None, status_schema())
        .await
        .unwrap();

    let views = service.get_views(&alice, &page_id).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name, "Table");
    assert_eq!(views[0].view_type, ViewType::Table);
    assert_eq!(views[0].config, ViewConfig::default());

    let item_id = service
        .create_item(&alice, &page_id, fields(&[("Status", "Done".into())]))
        .await
        .unwrap();
    let items = service.get_items(&alice, &page_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, item_id);
    assert_eq!(items[0].field("Status"), &FieldValue::Text("Done".into()));
    assert_eq!(items[0].owner_id, "alice");
}

#[tokio::test]
async fn writes_require_authentication_and_reads_degrade_to_empty() {
    let service = service().await;
    let alice = Caller::user("alice");
    let nobody = Caller::anonymous();
    let page_id = service.create_database(&alice, "Tasks", None, status_schema()).await.unwrap();
    service.create_item(&alice, &page_id, Fields::new()).await.unwrap();

    assert!(matches!(
        service.create_database(&nobody, "Nope", None, Vec::new()).await,
        Err(WorkspaceError::NotAuthenticated)
    ));
    assert!(matches!(
        service.create_item(&nobody, &page_id, Fields::new()).await,
        Err(WorkspaceError::NotAuthenticated)
    ));
    assert!(service.get_items(&nobody, &page_id).await.unwrap().is_empty());
    assert!(service.get_views(&nobody, &page_id).await.unwrap().is_empty());
    assert!(service.get_page(&nobody, &page_id).await.unwrap().is_none());
}

#[tokio::test]
async fn last_view_cannot_be_deleted() {
    let service = service().await;
    let alice = Caller::user("alice");
    let page_id = service.create_database(&alice, "Tasks", None, Vec::new()).await.unwrap();
    let table = service.get_views(&alice, &page_id).await.unwrap().remove(0);

    let err = service.delete_view(&alice, &table.id).await.unwrap_err();
    assert!(matches!(err, WorkspaceError::InvariantViolation(_)));
    assert_eq!(err.to_string(), "Cannot delete the last view");
    assert_eq!(service.get_views(&alice, &page_id).await.unwrap(), vec![table.clone()]);

    let board = service
        .create_view(&alice, &page_id, "Board", ViewType::Kanban, ViewConfig::default())
        .await
        .unwrap();
    service.delete_view(&alice, &table.id).await.unwrap();

    let remaining = service.get_views(&alice, &page_id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, board);
    assert!(matches!(
        service.delete_view(&alice, &board).await,
        Err(WorkspaceError::InvariantViolation(_))
    ));
}

#[tokio::test]
async fn concurrent_deletes_keep_one_view() {
    let service = service().await;
    let alice = Caller::user("alice");
    let page_id = service.create_database(&alice, "Tasks", None, Vec::new()).await.unwrap();
    service
        .create_view(&alice, &page_id, "List", ViewType::List, ViewConfig::default())
        .await
        .unwrap();
    let views = service.get_views(&alice, &page_id).await.unwrap();

    let (first, second) = tokio::join!(
        service.delete_view(&alice, &views[0].id),
        service.delete_view(&alice, &views[1].id)
    );

    assert_eq!(usize::from(first.is_ok()) + usize::from(second.is_ok()), 1);
    assert_eq!(service.get_views(&alice, &page_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_item_replaces_whole_map_and_is_idempotent() {
    let service = service().await;
    let alice = Caller::user("alice");
    let schema = vec![
        ColumnDefinition::new("Name", ColumnType::Text),
        ColumnDefinition::new("Estimate", ColumnType::Number),
    ];
    let page_id = service.create_database(&alice, "Tasks", None, schema).await.unwrap();
    let item_id = service
        .create_item(&alice, &page_id, fields(&[("Name", "Draft".into()), ("Estimate", FieldValue::Number(3.0))]))
        .await
        .unwrap();

    let replacement = fields(&[("Name", "Final".into())]);
    service.update_item(&alice, &item_id, replacement.clone()).await.unwrap();
    let once = service.get_items(&alice, &page_id).await.unwrap();
    service.update_item(&alice, &item_id, replacement.clone()).await.unwrap();
    let twice = service.get_items(&alice, &page_id).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(once[0].fields, replacement);
    assert_eq!(once[0].field("Estimate"), &FieldValue::Null);
}

#[tokio::test]
async fn item_values_are_validated_against_schema() {
    let service = service().await;
    let alice = Caller::user("alice");
    let schema = vec![ColumnDefinition::new("Estimate", ColumnType::Number)];
    let page_id = service.create_database(&alice, "Tasks", None, schema).await.unwrap();

    let err = service
        .create_item(&alice, &page_id, fields(&[("Estimate", "lots".into())]))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidField { ref column, .. } if column == "Estimate"));

    let err = service
        .create_item(&alice, &page_id, fields(&[("Unknown", FieldValue::Null)]))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkspaceError::InvalidField { .. }));
    assert!(service.get_items(&alice, &page_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_column_appends_in_order() {
    let service = service().await;
    let alice = Caller::user("alice");
    let page_id = service.create_database(&alice, "Tasks", None, status_schema()).await.unwrap();

    let due = ColumnDefinition::new("Due", ColumnType::Date);
    let tags = ColumnDefinition::new("Tags", ColumnType::Multiselect).with_options(vec![SelectOption {
        label: "urgent".into(),
        color: "#FF0000".into(),
    }]);
    service.add_column(&alice, &page_id, due.clone()).await.unwrap();
    service.add_column(&alice, &page_id, tags.clone()).await.unwrap();

    let page = service.get_page(&alice, &page_id).await.unwrap().unwrap();
    let mut expected = status_schema();
    expected.push(due);
    expected.push(tags);
    assert_eq!(page.schema, expected);

    // existing items simply have no value for the new columns
    let item_id = service.create_item(&alice, &page_id, Fields::new()).await.unwrap();
    let items = service.get_items(&alice, &page_id).await.unwrap();
    assert_eq!(items[0].id, item_id);
    assert!(items[0].field("Due").is_null());
}

#[tokio::test]
async fn database_operations_reject_document_pages() {
    let service = service().await;
    let alice = Caller::user("alice");
    let page_id = service.create_page(&alice, "Notes", None).await.unwrap();

    let err = service.create_item(&alice, &page_id, Fields::new()).await.unwrap_err();
    assert!(is_denied(&err, EntityKind::Database));
    let err = service
        .add_column(&alice, &page_id, ColumnDefinition::new("X", ColumnType::Text))
        .await
        .unwrap_err();
    assert!(is_denied(&err, EntityKind::Database));
    let err = service
        .create_view(&alice, &page_id, "Table", ViewType::Table, ViewConfig::default())
        .await
        .unwrap_err();
    assert!(is_denied(&err, EntityKind::Database));
}

#[tokio::test]
async fn foreign_entities_are_indistinguishable_from_missing_ones() {
    let service = service().await;
    let alice = Caller::user("alice");
    let mallory = Caller::user("mallory");
    let page_id = service.create_database(&alice, "Tasks", None, status_schema()).await.unwrap();
    let item_id = service.create_item(&alice, &page_id, Fields::new()).await.unwrap();
    let view_id = service.get_views(&alice, &page_id).await.unwrap()[0].id.clone();

    for id in [item_id.as_str(), "missing-item"] {
        let err = service.update_item(&mallory, id, Fields::new()).await.unwrap_err();
        assert!(is_denied(&err, EntityKind::Item));
        let err = service.delete_item(&mallory, id).await.unwrap_err();
        assert!(is_denied(&err, EntityKind::Item));
    }
    for id in [view_id.as_str(), "missing-view"] {
        let err = service.update_view(&mallory, id, ViewPatch::default()).await.unwrap_err();
        assert!(is_denied(&err, EntityKind::View));
        let err = service.delete_view(&mallory, id).await.unwrap_err();
        assert!(is_denied(&err, EntityKind::View));
    }

    let err = service.create_item(&mallory, &page_id, Fields::new()).await.unwrap_err();
    assert!(is_denied(&err, EntityKind::Database));
    assert!(service.get_items(&mallory, &page_id).await.unwrap().is_empty());
    assert!(service.get_views(&mallory, &page_id).await.unwrap().is_empty());
    assert!(service.get_page(&mallory, &page_id).await.unwrap().is_none());

    assert_eq!(service.get_items(&alice, &page_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_view_patches_only_supplied_parts() {
    let service = service().await;
    let alice = Caller::user("alice");
    let page_id = service.create_database(&alice, "Tasks", None, status_schema()).await.unwrap();
    let config = ViewConfig { kanban_field: Some("Status".into()), ..Default::default() };
    let view_id = service
        .create_view(&alice, &page_id, "Board", ViewType::Kanban, config.clone())
        .await
        .unwrap();

    service
        .update_view(&alice, &view_id, ViewPatch { name: Some("Status board".into()), config: None })
        .await
        .unwrap();
    let view = service.get_views(&alice, &page_id).await.unwrap().remove(1);
    assert_eq!(view.name, "Status board");
    assert_eq!(view.config, config);

    let sorted = ViewConfig { sort_by: Some("Status".into()), ..Default::default() };
    service
        .update_view(&alice, &view_id, ViewPatch { name: None, config: Some(sorted.clone()) })
        .await
        .unwrap();
    let view = service.get_views(&alice, &page_id).await.unwrap().remove(1);
    assert_eq!(view.name, "Status board");
    assert_eq!(view.config, sorted);
}

#[tokio::test]
async fn deleting_a_page_leaves_items_and_views() {
    let service = service().await;
    let alice = Caller::user("alice");
    let page_id = service.create_database(&alice, "Tasks", None, status_schema()).await.unwrap();
    service.create_item(&alice, &page_id, Fields::new()).await.unwrap();

    service.delete_page(&alice, &page_id).await.unwrap();

    assert!(service.get_page(&alice, &page_id).await.unwrap().is_none());
    assert_eq!(service.get_items(&alice, &page_id).await.unwrap().len(), 1);
    assert_eq!(service.get_views(&alice, &page_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn render_uses_first_view_or_named_view() {
    let service = service().await;
    let alice = Caller::user("alice");
    let page_id = service.create_database(&alice, "Tasks", None, status_schema()).await.unwrap();
    service
        .create_item(&alice, &page_id, fields(&[("Status", "Done".into())]))
        .await
        .unwrap();

    match service.render_view(&alice, &page_id, None).await.unwrap() {
        Layout::Table { columns, groups } => {
            assert_eq!(columns, vec!["Status".to_string()]);
            assert_eq!(groups[0].entries.len(), 1);
        }
        other => panic!("expected table, got {other:?}"),
    }

    let calendar = service
        .create_view(&alice, &page_id, "Calendar", ViewType::Calendar, ViewConfig::default())
        .await
        .unwrap();
    assert!(matches!(
        service.render_view(&alice, &page_id, Some(&calendar)).await.unwrap(),
        Layout::Prompt { .. }
    ));

    let err = service.render_view(&alice, &page_id, Some("nope")).await.unwrap_err();
    assert!(is_denied(&err, EntityKind::View));
}
