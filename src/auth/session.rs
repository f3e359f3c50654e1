/// Bearer-token sessions
///
/// Stand-in for a hosted auth provider: anonymous sign-in creates a user and
/// hands back an opaque token that later requests present as
/// `Authorization: Bearer <token>`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a fresh user and a session token for it
    pub async fn sign_in_anonymous(&self) -> Result<Session> {
        let session = Session {
            user_id: uuid::Uuid::new_v4().to_string(),
            token: uuid::Uuid::new_v4().simple().to_string(),
        };
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO users (id, created_at) VALUES (?, ?)")
            .bind(&session.user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(&session.user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!("🔑 Anonymous sign-in: user {}", session.user_id);
        Ok(session)
    }

    /// Resolve a bearer token to its user id
    pub async fn resolve(&self, token: &str) -> Result<Option<String>> {
        let user_id: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user_id.map(|(id,)| id))
    }

    /// Drop a session token; unknown tokens are ignored
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
