/// Document REST endpoints
///
/// Documents are addressed by id only; ownership is recorded but not enforced.

use crate::{
    api::{database::CreatedResponse, AppState},
    documents::{Document, RichText},
    error::{Result, WorkspaceError},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub title: String,
    pub owner_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub content: RichText,
}

pub fn create_document_routes() -> Router<AppState> {
    Router::new()
        .route("/api/documents", post(create_document))
        .route("/api/documents/{id}", get(get_document))
        .route("/api/documents/{id}", put(update_document))
}

/// POST /api/documents
/// Body: { "title": "...", "ownerId": "..." }
async fn create_document(
    State(state): State<AppState>,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state
        .documents
        .create_document(&payload.title, &payload.owner_id)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Get a document; null when absent
///
/// GET /api/documents/{id}
async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>> {
    Ok(Json(state.documents.get_document(&id).await?))
}

/// Replace a document's content tree
///
/// PUT /api/documents/{id}
/// Body: { "content": <editor document> }
async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<StatusCode> {
    if !state.documents.update_content(&id, &payload.content).await? {
        return Err(WorkspaceError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
