/// Sign-in endpoints

use crate::{
    api::{bearer_token, AppState},
    auth::Session,
    error::Result,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{delete, post},
    Router,
};

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/anonymous", post(sign_in_anonymous))
        .route("/api/auth/session", delete(sign_out))
}

/// Create an anonymous user and session
///
/// POST /api/auth/anonymous
/// Returns: { "userId": "...", "token": "..." }
async fn sign_in_anonymous(State(state): State<AppState>) -> Result<(StatusCode, Json<Session>)> {
    let session = state.sessions.sign_in_anonymous().await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Drop the presented bearer token; unknown or missing tokens are ignored
///
/// DELETE /api/auth/session
async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.sign_out(token).await?;
        tracing::info!("👋 Session signed out");
    }
    Ok(StatusCode::NO_CONTENT)
}
