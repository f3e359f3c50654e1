/// HTTP API Layer
///
/// REST endpoints over the workspace handlers:
/// - Anonymous sign-in and bearer-token resolution
/// - Database pages: schema, items, views and rendered layouts
/// - Documents, file uploads and page media

use crate::{
    auth::{Caller, SessionStore},
    documents::DocumentStorage,
    error::WorkspaceError,
    files::FileStorage,
    media::MediaStorage,
    workspace::WorkspaceService,
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    Router,
};

// Sign-in endpoint
pub mod auth;

// Pages, items and views
pub mod database;

// Rich-text documents
pub mod documents;

// Upload URLs, blobs and file metadata
pub mod files;

// Drawings and voice notes
pub mod media;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Guarded database-page handlers
    pub workspace: WorkspaceService,
    /// Bearer-token sessions
    pub sessions: SessionStore,
    pub documents: DocumentStorage,
    pub files: FileStorage,
    pub media: MediaStorage,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
}

/// Create every API route
pub fn create_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(auth::create_auth_routes())
        .merge(database::create_database_routes())
        .merge(documents::create_document_routes())
        .merge(files::create_file_routes(max_upload_bytes))
        .merge(media::create_media_routes())
}

/// Resolve the caller from an optional `Authorization: Bearer <token>` header
///
/// Missing, malformed or unknown tokens yield an anonymous caller; handlers
/// decide whether that is acceptable.
impl FromRequestParts<AppState> for Caller {
    type Rejection = WorkspaceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Caller::anonymous());
        };

        match state.sessions.resolve(token).await? {
            Some(user_id) => Ok(Caller::user(user_id)),
            None => {
                tracing::debug!("🔍 Unknown session token, treating request as anonymous");
                Ok(Caller::anonymous())
            }
        }
    }
}

/// Token from an `Authorization: Bearer <token>` header, if present
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
