/// Database page REST endpoints
///
/// Pages, schema columns, items and views. Ownership checks live in
/// `WorkspaceService`; handlers only translate HTTP to service calls.

use crate::{
    api::AppState,
    auth::Caller,
    error::Result,
    render::Layout,
    workspace::{ColumnDefinition, Fields, Item, Page, View, ViewConfig, ViewPatch, ViewType},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

/// Response for create operations
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    pub title: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub schema: Vec<ColumnDefinition>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddColumnRequest {
    pub column: ColumnDefinition,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemFieldsRequest {
    pub fields: Fields,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateViewRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    #[serde(default)]
    pub config: ViewConfig,
}

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub view: Option<String>,
}

pub fn create_database_routes() -> Router<AppState> {
    Router::new()
        .route("/api/pages", get(list_pages))
        .route("/api/pages", post(create_page))
        .route("/api/pages/{id}", get(get_page))
        .route("/api/pages/{id}", delete(delete_page))
        .route("/api/databases", post(create_database))
        .route("/api/pages/{id}/columns", post(add_column))
        .route("/api/pages/{id}/items", get(get_items))
        .route("/api/pages/{id}/items", post(create_item))
        .route("/api/items/{id}", put(update_item))
        .route("/api/items/{id}", delete(delete_item))
        .route("/api/pages/{id}/views", get(get_views))
        .route("/api/pages/{id}/views", post(create_view))
        .route("/api/views/{id}", patch(update_view))
        .route("/api/views/{id}", delete(delete_view))
        .route("/api/pages/{id}/render", get(render_view))
}

/// List the caller's pages
///
/// GET /api/pages
async fn list_pages(State(state): State<AppState>, caller: Caller) -> Result<Json<Vec<Page>>> {
    Ok(Json(state.workspace.list_pages(&caller).await?))
}

/// Create a plain document page
///
/// POST /api/pages
/// Body: { "title": "...", "parentId": "..."? }
async fn create_page(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreatePageRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state
        .workspace
        .create_page(&caller, &payload.title, payload.parent_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Get one page (null when missing or not the caller's)
///
/// GET /api/pages/{id}
async fn get_page(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Option<Page>>> {
    Ok(Json(state.workspace.get_page(&caller, &id).await?))
}

/// DELETE /api/pages/{id}
async fn delete_page(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.workspace.delete_page(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a database page with its default table view
///
/// POST /api/databases
/// Body: { "title": "...", "parentId": "..."?, "schema": [{ "name": "...", "type": "...", "options": [...]? }] }
async fn create_database(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateDatabaseRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state
        .workspace
        .create_database(&caller, &payload.title, payload.parent_id.as_deref(), payload.schema)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Append a column to the schema
///
/// POST /api/pages/{id}/columns
/// Body: { "column": { "name": "...", "type": "..." } }
async fn add_column(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<AddColumnRequest>,
) -> Result<StatusCode> {
    state.workspace.add_column(&caller, &id, payload.column).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/pages/{id}/items
async fn get_items(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Vec<Item>>> {
    Ok(Json(state.workspace.get_items(&caller, &id).await?))
}

/// POST /api/pages/{id}/items
/// Body: { "fields": { "<column>": <value>, ... } }
async fn create_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<ItemFieldsRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state.workspace.create_item(&caller, &id, payload.fields).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Replace an item's fields
///
/// PUT /api/items/{id}
/// Body: { "fields": { ... } }
async fn update_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<ItemFieldsRequest>,
) -> Result<StatusCode> {
    state.workspace.update_item(&caller, &id, payload.fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/items/{id}
async fn delete_item(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.workspace.delete_item(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/pages/{id}/views
async fn get_views(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Vec<View>>> {
    Ok(Json(state.workspace.get_views(&caller, &id).await?))
}

/// POST /api/pages/{id}/views
/// Body: { "name": "...", "type": "table|list|gallery|calendar|kanban", "config": { ... } }
async fn create_view(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<CreateViewRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state
        .workspace
        .create_view(&caller, &id, &payload.name, payload.view_type, payload.config)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Patch a view's name and/or config
///
/// PATCH /api/views/{id}
/// Body: { "name": "..."?, "config": { ... }? }
async fn update_view(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(payload): Json<ViewPatch>,
) -> Result<StatusCode> {
    state.workspace.update_view(&caller, &id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a view; 409 when it is the last one on its page
///
/// DELETE /api/views/{id}
async fn delete_view(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.workspace.delete_view(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Render a view's layout
///
/// GET /api/pages/{id}/render?view={viewId}
async fn render_view(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Query(query): Query<RenderQuery>,
) -> Result<Json<Layout>> {
    let layout = state
        .workspace
        .render_view(&caller, &id, query.view.as_deref())
        .await?;
    Ok(Json(layout))
}
