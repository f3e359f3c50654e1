/// SQLite persistence for documents

use crate::documents::types::{Attachment, Document, RichText};
use crate::error::Result;
use sqlx::{
    sqlite::{SqliteConnection, SqlitePool},
    Row,
};

#[derive(Debug, Clone)]
pub struct DocumentStorage {
    pool: SqlitePool,
}

impl DocumentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a document with empty editor content
    pub async fn create_document(&self, title: &str, owner_id: &str) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO documents (id, title, owner_id, content) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(title)
            .bind(owner_id)
            .bind(serde_json::to_string(&RichText::empty())?)
            .execute(&self.pool)
            .await?;

        tracing::info!("📄 Created document {} ({})", id, title);
        Ok(id)
    }

    pub async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query("SELECT id, title, owner_id, content FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let content_json: String = row.get("content");
                Ok(Some(Document {
                    id: row.get("id"),
                    title: row.get("title"),
                    owner_id: row.get("owner_id"),
                    content: serde_json::from_str(&content_json)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// Replace the document content; returns false when the document does not exist
    pub async fn update_content(&self, id: &str, content: &RichText) -> Result<bool> {
        let result = sqlx::query("UPDATE documents SET content = ? WHERE id = ?")
            .bind(serde_json::to_string(content)?)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append an attachment to a document's content; missing documents are skipped
    ///
    /// Runs on the caller's transaction, which must hold the write lock
    /// (`BEGIN IMMEDIATE`) so concurrent appends to one document serialize.
    pub async fn append_attachment_in(
        conn: &mut SqliteConnection,
        id: &str,
        attachment: &Attachment,
    ) -> Result<bool> {
        let row = sqlx::query("SELECT content FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        let Some(row) = row else {
            return Ok(false);
        };

        let content_json: String = row.get("content");
        let mut content: RichText = serde_json::from_str(&content_json)?;
        content.push_attachment(attachment)?;

        sqlx::query("UPDATE documents SET content = ? WHERE id = ?")
            .bind(serde_json::to_string(&content)?)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        tracing::debug!("📎 Attached {} to document {}", attachment.name, id);
        Ok(true)
    }
}
