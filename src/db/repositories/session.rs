//! Session repository
//!
//! Database operations for auth sessions.

use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, session: &Session) -> Result<()>;

    /// Get a session by token
    async fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session by token; returns whether a row was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Delete all expired sessions; returns the number removed
    async fn delete_expired(&self) -> Result<i64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: SqlitePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session")?;

        Ok(row.map(|row| Session {
            id: row.get("id"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self) -> Result<i64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;

    async fn setup() -> (SqlitePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        (pool.clone(), SqlxSessionRepository::new(pool))
    }

    async fn create_user(pool: &SqlitePool) -> i64 {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES ('chef', 'chef@example.com', 'h')",
        )
        .execute(pool)
        .await
        .expect("Failed to create user");
        result.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_create_get_delete_session() {
        let (pool, repo) = setup().await;
        let user_id = create_user(&pool).await;

        let session = Session::new(user_id, Duration::days(7));
        repo.create(&session).await.expect("Failed to create session");

        let found = repo
            .get(&session.id)
            .await
            .expect("Failed to get session")
            .expect("Session not found");
        assert_eq!(found.user_id, user_id);

        assert!(repo.delete(&session.id).await.unwrap());
        assert!(repo.get(&session.id).await.unwrap().is_none());
        // Second delete removes nothing
        assert!(!repo.delete(&session.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_expired_sessions() {
        let (pool, repo) = setup().await;
        let user_id = create_user(&pool).await;

        let mut expired = Session::new(user_id, Duration::days(7));
        expired.expires_at = Utc::now() - Duration::hours(1);
        repo.create(&expired).await.unwrap();

        let live = Session::new(user_id, Duration::days(7));
        repo.create(&live).await.unwrap();

        let removed = repo.delete_expired().await.expect("Failed to clean up");
        assert_eq!(removed, 1);
        assert!(repo.get(&live.id).await.unwrap().is_some());
        assert!(repo.get(&expired.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_cascade_on_user_delete() {
        let (pool, repo) = setup().await;
        let user_id = create_user(&pool).await;

        let session = Session::new(user_id, Duration::days(7));
        repo.create(&session).await.unwrap();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(repo.get(&session.id).await.unwrap().is_none());
    }
}
