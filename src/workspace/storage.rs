/// SQLite persistence for pages, items and views
///
/// JSON-shaped columns (schema, fields, config) are stored as serialized TEXT.
/// Every write here is a single statement or a single transaction, so each
/// call is atomic on its own.

use crate::error::{Result, WorkspaceError};
use crate::workspace::types::{
    ColumnDefinition, Fields, Item, Page, PageType, View, ViewConfig, ViewType,
};
use sqlx::{
    sqlite::{SqlitePool, SqliteRow},
    Row,
};

#[derive(Debug, Clone)]
pub struct WorkspaceStorage {
    pool: SqlitePool,
}

/// Outcome of a guarded view delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDeletion {
    Deleted,
    LastView,
    Missing,
}

impl WorkspaceStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ---- pages ----

    pub async fn insert_page(&self, page: &Page) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pages (id, title, parent_id, owner_id, page_type, schema, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&page.id)
        .bind(&page.title)
        .bind(&page.parent_id)
        .bind(&page.owner_id)
        .bind(page.page_type.as_str())
        .bind(serde_json::to_string(&page.schema)?)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a database page together with its first view in one transaction
    pub async fn insert_database(&self, page: &Page, default_view: &View) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO pages (id, title, parent_id, owner_id, page_type, schema, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&page.id)
        .bind(&page.title)
        .bind(&page.parent_id)
        .bind(&page.owner_id)
        .bind(page.page_type.as_str())
        .bind(serde_json::to_string(&page.schema)?)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO views (id, page_id, owner_id, name, view_type, config)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&default_view.id)
        .bind(&default_view.page_id)
        .bind(&default_view.owner_id)
        .bind(&default_view.name)
        .bind(default_view.view_type.as_str())
        .bind(serde_json::to_string(&default_view.config)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_page(&self, id: &str) -> Result<Option<Page>> {
        let row = sqlx::query(
            "SELECT id, title, parent_id, owner_id, page_type, schema FROM pages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(page_from_row).transpose()
    }

    pub async fn list_pages(&self, owner_id: &str) -> Result<Vec<Page>> {
        let rows = sqlx::query(
            "SELECT id, title, parent_id, owner_id, page_type, schema FROM pages WHERE owner_id = ? ORDER BY rowid",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(page_from_row).collect()
    }

    /// Append a column to a page schema in a single statement
    pub async fn append_column(&self, page_id: &str, column: &ColumnDefinition) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE pages SET schema = json_insert(schema, '$[#]', json(?)) WHERE id = ?",
        )
        .bind(serde_json::to_string(column)?)
        .bind(page_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a page row only; items and views that point at it are left in place
    pub async fn delete_page(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---- items ----

    pub async fn list_items(&self, page_id: &str, owner_id: &str) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT id, page_id, owner_id, fields FROM items WHERE page_id = ? AND owner_id = ? ORDER BY rowid",
        )
        .bind(page_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    pub async fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let row = sqlx::query("SELECT id, page_id, owner_id, fields FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    pub async fn insert_item(&self, item: &Item) -> Result<()> {
        sqlx::query("INSERT INTO items (id, page_id, owner_id, fields) VALUES (?, ?, ?, ?)")
            .bind(&item.id)
            .bind(&item.page_id)
            .bind(&item.owner_id)
            .bind(serde_json::to_string(&item.fields)?)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Overwrite the entire fields map of an item
    pub async fn replace_item_fields(&self, id: &str, fields: &Fields) -> Result<bool> {
        let result = sqlx::query("UPDATE items SET fields = ? WHERE id = ?")
            .bind(serde_json::to_string(fields)?)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_item(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ---- views ----

    pub async fn list_views(&self, page_id: &str, owner_id: &str) -> Result<Vec<View>> {
        let rows = sqlx::query(
            "SELECT id, page_id, owner_id, name, view_type, config FROM views WHERE page_id = ? AND owner_id = ? ORDER BY rowid",
        )
        .bind(page_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(view_from_row).collect()
    }

    pub async fn get_view(&self, id: &str) -> Result<Option<View>> {
        let row = sqlx::query(
            "SELECT id, page_id, owner_id, name, view_type, config FROM views WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(view_from_row).transpose()
    }

    pub async fn insert_view(&self, view: &View) -> Result<()> {
        sqlx::query(
            "INSERT INTO views (id, page_id, owner_id, name, view_type, config) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&view.id)
        .bind(&view.page_id)
        .bind(&view.owner_id)
        .bind(&view.name)
        .bind(view.view_type.as_str())
        .bind(serde_json::to_string(&view.config)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Patch name and/or config; a `None` leaves the stored value untouched
    pub async fn patch_view(
        &self,
        id: &str,
        name: Option<&str>,
        config: Option<&ViewConfig>,
    ) -> Result<bool> {
        let config_json = config.map(serde_json::to_string).transpose()?;

        let result = sqlx::query(
            "UPDATE views SET name = COALESCE(?, name), config = COALESCE(?, config) WHERE id = ?",
        )
        .bind(name)
        .bind(config_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a view unless it is the last one left on its page
    ///
    /// The count and the delete run as one statement under SQLite's writer
    /// lock, so two concurrent deletes cannot both observe two views.
    pub async fn delete_view_unless_last(&self, id: &str, page_id: &str) -> Result<ViewDeletion> {
        let result = sqlx::query(
            r#"
            DELETE FROM views
            WHERE id = ?
              AND (SELECT COUNT(*) FROM views WHERE page_id = ?) > 1
            "#,
        )
        .bind(id)
        .bind(page_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(ViewDeletion::Deleted);
        }

        match self.get_view(id).await? {
            Some(_) => Ok(ViewDeletion::LastView),
            None => Ok(ViewDeletion::Missing),
        }
    }
}

fn page_from_row(row: &SqliteRow) -> Result<Page> {
    let page_type: String = row.get("page_type");
    let schema_json: String = row.get("schema");

    Ok(Page {
        id: row.get("id"),
        title: row.get("title"),
        parent_id: row.get("parent_id"),
        owner_id: row.get("owner_id"),
        page_type: PageType::parse(&page_type)
            .ok_or_else(|| corrupt(format!("unknown page type '{}'", page_type)))?,
        schema: serde_json::from_str(&schema_json)?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<Item> {
    let fields_json: String = row.get("fields");

    Ok(Item {
        id: row.get("id"),
        page_id: row.get("page_id"),
        owner_id: row.get("owner_id"),
        fields: serde_json::from_str(&fields_json)?,
    })
}

fn view_from_row(row: &SqliteRow) -> Result<View> {
    let view_type: String = row.get("view_type");
    let config_json: String = row.get("config");

    Ok(View {
        id: row.get("id"),
        page_id: row.get("page_id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        view_type: ViewType::parse(&view_type)
            .ok_or_else(|| corrupt(format!("unknown view type '{}'", view_type)))?,
        config: serde_json::from_str(&config_json)?,
    })
}

fn corrupt(message: String) -> WorkspaceError {
    WorkspaceError::Storage(sqlx::Error::Decode(message.into()))
}
