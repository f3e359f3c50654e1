/// SQLite persistence for drawings and voice notes

use crate::error::Result;
use crate::media::types::{Drawing, NewDrawing, NewVoiceNote, VoiceNote};
use sqlx::{sqlite::SqlitePool, Row};

#[derive(Debug, Clone)]
pub struct MediaStorage {
    pool: SqlitePool,
}

impl MediaStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_drawing(&self, page_id: &str, drawing: NewDrawing) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO drawings (id, page_id, data_url, width, height, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(page_id)
        .bind(&drawing.data_url)
        .bind(drawing.width)
        .bind(drawing.height)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        tracing::info!("🎨 Saved drawing {} on page {}", id, page_id);
        Ok(id)
    }

    pub async fn create_voice_note(&self, page_id: &str, note: NewVoiceNote) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO voice_notes (id, page_id, audio_url, duration, transcription, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(page_id)
        .bind(&note.audio_url)
        .bind(note.duration)
        .bind(&note.transcription)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        tracing::info!("🎙️ Saved voice note {} on page {}", id, page_id);
        Ok(id)
    }

    /// Drawings of a page, oldest first
    pub async fn drawings_for_page(&self, page_id: &str) -> Result<Vec<Drawing>> {
        let rows = sqlx::query(
            "SELECT id, page_id, data_url, width, height, created_at FROM drawings WHERE page_id = ? ORDER BY created_at, rowid",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Drawing {
                id: row.get("id"),
                page_id: row.get("page_id"),
                data_url: row.get("data_url"),
                width: row.get("width"),
                height: row.get("height"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// Voice notes of a page, oldest first
    pub async fn voice_notes_for_page(&self, page_id: &str) -> Result<Vec<VoiceNote>> {
        let rows = sqlx::query(
            "SELECT id, page_id, audio_url, duration, transcription, created_at FROM voice_notes WHERE page_id = ? ORDER BY created_at, rowid",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| VoiceNote {
                id: row.get("id"),
                page_id: row.get("page_id"),
                audio_url: row.get("audio_url"),
                duration: row.get("duration"),
                transcription: row.get("transcription"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
