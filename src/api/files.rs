/// Upload and file REST endpoints

use crate::{
    api::{database::CreatedResponse, AppState},
    error::{Result, WorkspaceError},
    files::{FileMetadata, NewFileMetadata},
};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub storage_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileUrlResponse {
    pub url: Option<String>,
}

pub fn create_file_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/upload-url", post(generate_upload_url))
        .route(
            "/api/uploads/{token}",
            post(upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/files", post(save_file_metadata))
        .route("/api/files/{id}", get(get_file_metadata))
        .route("/api/storage/{id}", get(download))
        .route("/api/storage/{id}/url", get(get_file_url))
}

/// Issue a single-use upload URL
///
/// POST /api/upload-url
/// Returns: { "url": "http://.../api/uploads/{token}" }
async fn generate_upload_url(State(state): State<AppState>) -> Result<Json<UploadUrlResponse>> {
    let url = state.files.generate_upload_url().await?;
    Ok(Json(UploadUrlResponse { url }))
}

/// Accept raw bytes for an upload token
///
/// POST /api/uploads/{token}
/// Body: file bytes, Content-Type: the file's MIME type
async fn upload(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    match state.files.store_upload(&token, content_type, &body).await? {
        Some(storage_id) => Ok(Json(UploadResponse { storage_id })),
        None => Err(WorkspaceError::NotFound),
    }
}

/// Record metadata for an uploaded file
///
/// POST /api/files
/// Body: { "storageId": "...", "name": "...", "type": "...", "size": 123, "documentId": "..."? }
async fn save_file_metadata(
    State(state): State<AppState>,
    Json(payload): Json<NewFileMetadata>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state.files.save_file_metadata(payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Get recorded file metadata; null when absent
///
/// GET /api/files/{id}
async fn get_file_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<FileMetadata>>> {
    Ok(Json(state.files.get_file_metadata(&id).await?))
}

/// GET /api/storage/{id}/url
async fn get_file_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FileUrlResponse>> {
    let url = state.files.get_file_url(&id).await?;
    Ok(Json(FileUrlResponse { url }))
}

/// Stream a stored blob back with its content type
///
/// GET /api/storage/{id}
async fn download(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    match state.files.read_blob(&id).await? {
        Some(blob) => Ok(([(CONTENT_TYPE, blob.content_type)], blob.bytes).into_response()),
        None => Err(WorkspaceError::NotFound),
    }
}
