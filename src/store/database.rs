/// Workspace database bootstrap
///
/// Opens the single SQLite database ({data_dir}/workspace.db) that backs every
/// handler and creates its tables. Bootstrap is idempotent.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Owner of the workspace connection pool
#[derive(Debug, Clone)]
pub struct WorkspaceDatabase {
    pool: SqlitePool,
}

impl WorkspaceDatabase {
    /// Open (or create) {data_dir}/workspace.db and initialize its schema
    pub async fn open(data_dir: &str) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))?;
        let db_path = Path::new(data_dir).join("workspace.db");

        tracing::info!("🗄️ Opening workspace database: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let database = Self { pool };
        database.init_schema().await?;

        tracing::info!("✅ Workspace database ready: {}", db_path.display());
        Ok(database)
    }

    /// Private in-memory database, used by tests and throwaway instances
    ///
    /// Pinned to a single connection that never expires, since every new
    /// connection to `sqlite::memory:` would see an empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.init_schema().await?;
        Ok(database)
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create every table and index used by the workspace
    async fn init_schema(&self) -> Result<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS pages (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                parent_id TEXT,
                owner_id TEXT NOT NULL,
                page_type TEXT NOT NULL,
                schema JSON NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                page_id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                fields JSON NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS views (
                id TEXT PRIMARY KEY,
                page_id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                view_type TEXT NOT NULL,
                config JSON NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                content JSON NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS upload_tokens (
                token TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS blobs (
                storage_id TEXT PRIMARY KEY,
                path TEXT NOT NULL,
                content_type TEXT NOT NULL,
                size INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS file_metadata (
                id TEXT PRIMARY KEY,
                storage_id TEXT NOT NULL,
                original_name TEXT NOT NULL,
                content_type TEXT NOT NULL,
                size INTEGER NOT NULL,
                document_id TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS drawings (
                id TEXT PRIMARY KEY,
                page_id TEXT NOT NULL,
                data_url TEXT NOT NULL,
                width REAL,
                height REAL,
                created_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS voice_notes (
                id TEXT PRIMARY KEY,
                page_id TEXT NOT NULL,
                audio_url TEXT NOT NULL,
                duration REAL,
                transcription TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_pages_owner ON pages(owner_id)",
            "CREATE INDEX IF NOT EXISTS idx_items_by_page ON items(page_id)",
            "CREATE INDEX IF NOT EXISTS idx_views_by_page ON views(page_id)",
            "CREATE INDEX IF NOT EXISTS idx_drawings_by_page ON drawings(page_id)",
            "CREATE INDEX IF NOT EXISTS idx_voice_notes_by_page ON voice_notes(page_id)",
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let database = WorkspaceDatabase::in_memory().await.unwrap();
        database.init_schema().await.unwrap();

        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('pages', 'items', 'views')",
        )
        .fetch_one(&database.pool())
        .await
        .unwrap();
        assert_eq!(row.0, 3);
    }

    #[tokio::test]
    async fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested");
        WorkspaceDatabase::open(data_dir.to_str().unwrap()).await.unwrap();
        assert!(data_dir.join("workspace.db").exists());
    }
}
