/// Drawing and voice note REST endpoints

use crate::{
    api::{database::CreatedResponse, AppState},
    error::Result,
    media::{Drawing, NewDrawing, NewVoiceNote, VoiceNote},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};

pub fn create_media_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/pages/{id}/drawings",
            get(get_drawings_for_page).post(create_drawing),
        )
        .route(
            "/api/pages/{id}/voice-notes",
            get(get_voice_notes_for_page).post(create_voice_note),
        )
}

/// POST /api/pages/{id}/drawings
/// Body: { "dataUrl": "data:image/png;base64,...", "width": 640?, "height": 480? }
async fn create_drawing(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
    Json(payload): Json<NewDrawing>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state.media.create_drawing(&page_id, payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/pages/{id}/drawings
async fn get_drawings_for_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Json<Vec<Drawing>>> {
    Ok(Json(state.media.drawings_for_page(&page_id).await?))
}

/// POST /api/pages/{id}/voice-notes
/// Body: { "audioUrl": "...", "duration": 12.5?, "transcription": "..."? }
async fn create_voice_note(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
    Json(payload): Json<NewVoiceNote>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = state.media.create_voice_note(&page_id, payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/pages/{id}/voice-notes
async fn get_voice_notes_for_page(
    State(state): State<AppState>,
    Path(page_id): Path<String>,
) -> Result<Json<Vec<VoiceNote>>> {
    Ok(Json(state.media.voice_notes_for_page(&page_id).await?))
}
