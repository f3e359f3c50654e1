/// Blob storage and file metadata
///
/// Blobs are written to `{upload_dir}/{storage_id}`; the `blobs` table maps a
/// storage id to its path and content type.

use crate::config::StorageConfig;
use crate::documents::{Attachment, DocumentStorage};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileStorage {
    pool: SqlitePool,
    upload_dir: PathBuf,
    public_base_url: String,
}

/// Metadata supplied after a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFileMetadata {
    pub storage_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub storage_id: String,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

/// Bytes of a stored blob together with their content type
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileStorage {
    pub fn new(pool: SqlitePool, config: &StorageConfig) -> Self {
        Self {
            pool,
            upload_dir: PathBuf::from(&config.upload_dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Issue a single-use upload URL
    pub async fn generate_upload_url(&self) -> Result<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();

        sqlx::query("INSERT INTO upload_tokens (token, created_at) VALUES (?, ?)")
            .bind(&token)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(format!("{}/api/uploads/{}", self.public_base_url, token))
    }

    /// Store uploaded bytes against an upload token
    ///
    /// Returns `None` when the token is unknown or already used.
    pub async fn store_upload(
        &self,
        token: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<Option<String>> {
        // Token, blob row and file land together or not at all
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let consumed = sqlx::query("DELETE FROM upload_tokens WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;
        if consumed.rows_affected() == 0 {
            tracing::warn!("🚫 Upload attempted with unknown token");
            return Ok(None);
        }

        let storage_id = uuid::Uuid::new_v4().to_string();
        let path = self.upload_dir.join(&storage_id);

        let stored: Result<()> = async {
            tokio::fs::create_dir_all(&self.upload_dir).await?;
            tokio::fs::write(&path, bytes).await?;

            sqlx::query(
                "INSERT INTO blobs (storage_id, path, content_type, size, created_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&storage_id)
            .bind(path.to_string_lossy().to_string())
            .bind(content_type)
            .bind(bytes.len() as i64)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(())
        }
        .await;

        if let Err(e) = stored {
            tracing::error!("❌ Failed to store upload {}: {}", storage_id, e);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        tracing::info!("📦 Stored blob {} ({} bytes, {})", storage_id, bytes.len(), content_type);
        Ok(Some(storage_id))
    }

    /// Record metadata and attach the file to its document when that document exists
    pub async fn save_file_metadata(&self, metadata: NewFileMetadata) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();

        // Metadata and attachment commit together; IMMEDIATE takes the write
        // lock up front so concurrent uploads to one document queue on it.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        sqlx::query(
            r#"
            INSERT INTO file_metadata (id, storage_id, original_name, content_type, size, document_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&metadata.storage_id)
        .bind(&metadata.name)
        .bind(&metadata.content_type)
        .bind(metadata.size as i64)
        .bind(&metadata.document_id)
        .execute(&mut *tx)
        .await?;

        if let Some(document_id) = &metadata.document_id {
            let attachment = Attachment {
                file_id: metadata.storage_id.clone(),
                name: metadata.name.clone(),
                content_type: metadata.content_type.clone(),
            };
            if !DocumentStorage::append_attachment_in(&mut tx, document_id, &attachment).await? {
                tracing::debug!("Document {} not found, metadata saved without attachment", document_id);
            }
        }

        tx.commit().await?;

        tracing::info!("🗂️ Saved file metadata {} for blob {}", id, metadata.storage_id);
        Ok(id)
    }

    pub async fn get_file_metadata(&self, id: &str) -> Result<Option<FileMetadata>> {
        let row = sqlx::query(
            "SELECT id, storage_id, original_name, content_type, size, document_id FROM file_metadata WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| FileMetadata {
            id: row.get("id"),
            storage_id: row.get("storage_id"),
            original_name: row.get("original_name"),
            content_type: row.get("content_type"),
            size: row.get::<i64, _>("size") as u64,
            document_id: row.get("document_id"),
        }))
    }

    /// Public URL of a stored blob, or `None` when no such blob exists
    pub async fn get_file_url(&self, storage_id: &str) -> Result<Option<String>> {
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT storage_id FROM blobs WHERE storage_id = ?")
                .bind(storage_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(exists.map(|(id,)| format!("{}/api/storage/{}", self.public_base_url, id)))
    }

    pub async fn read_blob(&self, storage_id: &str) -> Result<Option<StoredBlob>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT path, content_type FROM blobs WHERE storage_id = ?")
                .bind(storage_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((path, content_type)) => {
                let bytes = tokio::fs::read(&path).await?;
                Ok(Some(StoredBlob { content_type, bytes }))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkspaceDatabase;

    async fn storage(dir: &tempfile::TempDir) -> (FileStorage, DocumentStorage) {
        let database = WorkspaceDatabase::in_memory().await.unwrap();
        let documents = DocumentStorage::new(database.pool());
        let config = StorageConfig {
            upload_dir: dir.path().join("uploads").to_string_lossy().to_string(),
            public_base_url: "http://files.test/".to_string(),
            max_upload_bytes: 1024,
        };
        (FileStorage::new(database.pool(), &config), documents)
    }

    #[tokio::test]
    async fn upload_tokens_are_single_use() {
        let dir = tempfile::tempdir().unwrap();
        let (files, _) = storage(&dir).await;

        let url = files.generate_upload_url().await.unwrap();
        assert!(url.starts_with("http://files.test/api/uploads/"));
        let token = url.rsplit('/').next().unwrap();

        let storage_id = files.store_upload(token, "text/plain", b"hello").await.unwrap();
        assert!(storage_id.is_some());
        assert!(files.store_upload(token, "text/plain", b"again").await.unwrap().is_none());

        let storage_id = storage_id.unwrap();
        let blob = files.read_blob(&storage_id).await.unwrap().unwrap();
        assert_eq!(blob.bytes, b"hello");
        assert_eq!(blob.content_type, "text/plain");
        assert_eq!(
            files.get_file_url(&storage_id).await.unwrap(),
            Some(format!("http://files.test/api/storage/{storage_id}"))
        );
        assert_eq!(files.get_file_url("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn metadata_attaches_to_existing_documents_only() {
        let dir = tempfile::tempdir().unwrap();
        let (files, documents) = storage(&dir).await;
        let document_id = documents.create_document("Notes", "alice").await.unwrap();

        let id = files
            .save_file_metadata(NewFileMetadata {
                storage_id: "blob-1".into(),
                name: "photo.png".into(),
                content_type: "image/png".into(),
                size: 42,
                document_id: Some(document_id.clone()),
            })
            .await
            .unwrap();
        let saved = files.get_file_metadata(&id).await.unwrap().unwrap();
        assert_eq!(saved.original_name, "photo.png");
        assert_eq!(saved.size, 42);

        let document = documents.get_document(&document_id).await.unwrap().unwrap();
        assert_eq!(
            document.content.attachments(),
            vec![Attachment {
                file_id: "blob-1".into(),
                name: "photo.png".into(),
                content_type: "image/png".into(),
            }]
        );

        files
            .save_file_metadata(NewFileMetadata {
                storage_id: "blob-2".into(),
                name: "lost.png".into(),
                content_type: "image/png".into(),
                size: 1,
                document_id: Some("missing".into()),
            })
            .await
            .unwrap();
    }

    fn storage_config(upload_dir: &std::path::Path) -> StorageConfig {
        StorageConfig {
            upload_dir: upload_dir.to_string_lossy().to_string(),
            public_base_url: "http://files.test".to_string(),
            max_upload_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn concurrent_uploads_to_one_document_all_attach() {
        let dir = tempfile::tempdir().unwrap();
        let database = WorkspaceDatabase::open(dir.path().join("data").to_str().unwrap())
            .await
            .unwrap();
        let documents = DocumentStorage::new(database.pool());
        let files = FileStorage::new(database.pool(), &storage_config(&dir.path().join("uploads")));
        let document_id = documents.create_document("Notes", "alice").await.unwrap();

        let mut tasks = Vec::new();
        for n in 0..20 {
            let files = files.clone();
            let document_id = document_id.clone();
            tasks.push(tokio::spawn(async move {
                files
                    .save_file_metadata(NewFileMetadata {
                        storage_id: format!("blob-{n}"),
                        name: format!("file-{n}.txt"),
                        content_type: "text/plain".into(),
                        size: n,
                        document_id: Some(document_id),
                    })
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let document = documents.get_document(&document_id).await.unwrap().unwrap();
        assert_eq!(document.content.attachments().len(), 20);

        let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM file_metadata")
            .fetch_one(&database.pool())
            .await
            .unwrap();
        assert_eq!(rows.0, 20);
    }

    #[tokio::test]
    async fn failed_blob_write_keeps_the_token() {
        let dir = tempfile::tempdir().unwrap();
        let database = WorkspaceDatabase::open(dir.path().join("data").to_str().unwrap())
            .await
            .unwrap();

        // a regular file where the upload directory should be
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"not a directory").unwrap();
        let broken = FileStorage::new(database.pool(), &storage_config(&blocked.join("uploads")));

        let url = broken.generate_upload_url().await.unwrap();
        let token = url.rsplit('/').next().unwrap();
        assert!(broken.store_upload(token, "text/plain", b"hello").await.is_err());

        let blobs: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blobs")
            .fetch_one(&database.pool())
            .await
            .unwrap();
        assert_eq!(blobs.0, 0);

        let files = FileStorage::new(database.pool(), &storage_config(&dir.path().join("uploads")));
        let storage_id = files.store_upload(token, "text/plain", b"hello").await.unwrap().unwrap();
        assert_eq!(files.read_blob(&storage_id).await.unwrap().unwrap().bytes, b"hello");
    }
}
