/// Database-page request handlers
///
/// Every operation resolves the caller through the guard before touching
/// storage. Reads degrade to empty results for unauthenticated callers;
/// writes fail with `NotAuthenticated`.

use crate::auth::{Caller, Guard};
use crate::error::{EntityKind, Result, WorkspaceError};
use crate::render::{self, Layout};
use crate::workspace::storage::{ViewDeletion, WorkspaceStorage};
use crate::workspace::types::{
    ColumnDefinition, Fields, Item, Page, PageType, View, ViewConfig, ViewPatch, ViewType,
};
use crate::workspace::validation::validate_fields;

pub const DEFAULT_VIEW_NAME: &str = "Table";
pub const LAST_VIEW_MESSAGE: &str = "Cannot delete the last view";

#[derive(Debug, Clone)]
pub struct WorkspaceService {
    storage: WorkspaceStorage,
}

impl WorkspaceService {
    pub fn new(storage: WorkspaceStorage) -> Self {
        Self { storage }
    }

    // ---- pages ----

    /// Create a plain document page
    pub async fn create_page(
        &self,
        caller: &Caller,
        title: &str,
        parent_id: Option<&str>,
    ) -> Result<String> {
        let user = Guard::new(caller).user()?;
        let page = Page {
            id: new_id(),
            title: title.to_string(),
            parent_id: parent_id.map(str::to_string),
            owner_id: user.to_string(),
            page_type: PageType::Document,
            schema: Vec::new(),
        };
        self.storage.insert_page(&page).await?;

        tracing::info!("📄 Created page {} ({})", page.id, page.title);
        Ok(page.id)
    }

    /// Create a database page and its default "Table" view
    pub async fn create_database(
        &self,
        caller: &Caller,
        title: &str,
        parent_id: Option<&str>,
        schema: Vec<ColumnDefinition>,
    ) -> Result<String> {
        let user = Guard::new(caller).user()?;
        let page = Page {
            id: new_id(),
            title: title.to_string(),
            parent_id: parent_id.map(str::to_string),
            owner_id: user.to_string(),
            page_type: PageType::Database,
            schema,
        };
        let default_view = View {
            id: new_id(),
            page_id: page.id.clone(),
            name: DEFAULT_VIEW_NAME.to_string(),
            view_type: ViewType::Table,
            config: ViewConfig::default(),
            owner_id: user.to_string(),
        };
        self.storage.insert_database(&page, &default_view).await?;

        tracing::info!(
            "🗃️ Created database {} ({}) with {} columns",
            page.id,
            page.title,
            page.schema.len()
        );
        Ok(page.id)
    }

    /// The caller's page, or `None` when missing, foreign, or unauthenticated
    pub async fn get_page(&self, caller: &Caller, page_id: &str) -> Result<Option<Page>> {
        let Some(user) = caller.user_id() else {
            return Ok(None);
        };
        let page = self.storage.get_page(page_id).await?;
        Ok(page.filter(|p| p.owner_id == user))
    }

    pub async fn list_pages(&self, caller: &Caller) -> Result<Vec<Page>> {
        match caller.user_id() {
            Some(user) => self.storage.list_pages(user).await,
            None => Ok(Vec::new()),
        }
    }

    /// Delete a page; its items and views are not touched
    pub async fn delete_page(&self, caller: &Caller, page_id: &str) -> Result<()> {
        let guard = Guard::new(caller);
        let page = guard.owned(self.storage.get_page(page_id).await?)?;
        self.storage.delete_page(&page.id).await?;

        tracing::info!("🗑️ Deleted page {}", page.id);
        Ok(())
    }

    /// Append a column to a database schema
    pub async fn add_column(
        &self,
        caller: &Caller,
        page_id: &str,
        column: ColumnDefinition,
    ) -> Result<()> {
        let guard = Guard::new(caller);
        let page = guard.database(self.storage.get_page(page_id).await?)?;

        if !self.storage.append_column(&page.id, &column).await? {
            return Err(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::Database });
        }

        tracing::info!("➕ Added column '{}' ({:?}) to {}", column.name, column.column_type, page.id);
        Ok(())
    }

    // ---- items ----

    pub async fn get_items(&self, caller: &Caller, page_id: &str) -> Result<Vec<Item>> {
        match caller.user_id() {
            Some(user) => self.storage.list_items(page_id, user).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn create_item(&self, caller: &Caller, page_id: &str, fields: Fields) -> Result<String> {
        let guard = Guard::new(caller);
        let page = guard.database(self.storage.get_page(page_id).await?)?;
        validate_fields(&page.schema, &fields)?;

        let item = Item {
            id: new_id(),
            page_id: page.id.clone(),
            fields,
            owner_id: guard.user()?.to_string(),
        };
        self.storage.insert_item(&item).await?;

        tracing::info!("📝 Created item {} in {}", item.id, page.id);
        Ok(item.id)
    }

    /// Replace the whole fields map of an item
    pub async fn update_item(&self, caller: &Caller, item_id: &str, fields: Fields) -> Result<()> {
        let guard = Guard::new(caller);
        let item = guard.owned(self.storage.get_item(item_id).await?)?;

        // Items outlive their page; an orphan has no schema to validate against.
        let page = self
            .storage
            .get_page(&item.page_id)
            .await?
            .ok_or(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::Database })?;
        validate_fields(&page.schema, &fields)?;

        if !self.storage.replace_item_fields(&item.id, &fields).await? {
            return Err(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::Item });
        }

        tracing::debug!("✏️ Updated item {}", item.id);
        Ok(())
    }

    pub async fn delete_item(&self, caller: &Caller, item_id: &str) -> Result<()> {
        let guard = Guard::new(caller);
        let item = guard.owned(self.storage.get_item(item_id).await?)?;
        self.storage.delete_item(&item.id).await?;

        tracing::info!("🗑️ Deleted item {}", item.id);
        Ok(())
    }

    // ---- views ----

    pub async fn get_views(&self, caller: &Caller, page_id: &str) -> Result<Vec<View>> {
        match caller.user_id() {
            Some(user) => self.storage.list_views(page_id, user).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn create_view(
        &self,
        caller: &Caller,
        page_id: &str,
        name: &str,
        view_type: ViewType,
        config: ViewConfig,
    ) -> Result<String> {
        let guard = Guard::new(caller);
        let page = guard.database(self.storage.get_page(page_id).await?)?;

        let view = View {
            id: new_id(),
            page_id: page.id.clone(),
            name: name.to_string(),
            view_type,
            config,
            owner_id: guard.user()?.to_string(),
        };
        self.storage.insert_view(&view).await?;

        tracing::info!("👁️ Created {} view {} on {}", view.view_type.as_str(), view.id, page.id);
        Ok(view.id)
    }

    /// Patch only the supplied parts of a view
    pub async fn update_view(&self, caller: &Caller, view_id: &str, patch: ViewPatch) -> Result<()> {
        let guard = Guard::new(caller);
        let view = guard.owned(self.storage.get_view(view_id).await?)?;

        if patch.name.is_none() && patch.config.is_none() {
            return Ok(());
        }
        if !self
            .storage
            .patch_view(&view.id, patch.name.as_deref(), patch.config.as_ref())
            .await?
        {
            return Err(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::View });
        }

        tracing::debug!("✏️ Updated view {}", view.id);
        Ok(())
    }

    /// Delete a view, refusing to remove the last one on its page
    pub async fn delete_view(&self, caller: &Caller, view_id: &str) -> Result<()> {
        let guard = Guard::new(caller);
        let view = guard.owned(self.storage.get_view(view_id).await?)?;

        match self.storage.delete_view_unless_last(&view.id, &view.page_id).await? {
            ViewDeletion::Deleted => {
                tracing::info!("🗑️ Deleted view {} from {}", view.id, view.page_id);
                Ok(())
            }
            ViewDeletion::LastView => {
                tracing::warn!("⚠️ Refused to delete last view {} of {}", view.id, view.page_id);
                Err(WorkspaceError::InvariantViolation(LAST_VIEW_MESSAGE.to_string()))
            }
            ViewDeletion::Missing => {
                Err(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::View })
            }
        }
    }

    // ---- rendering ----

    /// Build the layout for one of a database's views
    ///
    /// Without a view id the first view is used; a page with no views yields
    /// the "create a view" prompt.
    pub async fn render_view(
        &self,
        caller: &Caller,
        page_id: &str,
        view_id: Option<&str>,
    ) -> Result<Layout> {
        let guard = Guard::new(caller);
        let page = guard.database(self.storage.get_page(page_id).await?)?;
        let user = guard.user()?;

        let views = self.storage.list_views(&page.id, user).await?;
        let view = match view_id {
            Some(id) => views
                .iter()
                .find(|v| v.id == id)
                .ok_or(WorkspaceError::NotFoundOrAccessDenied { kind: EntityKind::View })?,
            None => match views.first() {
                Some(view) => view,
                None => return Ok(render::view::no_views()),
            },
        };

        let items = self.storage.list_items(&page.id, user).await?;
        tracing::debug!("🖼️ Rendering {} view {} over {} items", view.view_type.as_str(), view.id, items.len());
        Ok(render::render(view, &items, &page.schema))
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
