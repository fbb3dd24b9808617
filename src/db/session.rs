//! Session repository.
//!
//! A session row maps the hash of an opaque cookie secret to a user. The
//! plain secret only ever lives in the browser's cookie.

use super::DbPool;
use crate::datetime;
use crate::Result;

/// Session entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Row ID.
    pub id: i64,
    /// User this session belongs to.
    pub user_id: i64,
    /// SHA-256 hash of the cookie secret.
    pub secret_hash: String,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// New session for creation.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// User the session is for.
    pub user_id: i64,
    /// SHA-256 hash of the cookie secret.
    pub secret_hash: String,
    /// Expiration timestamp.
    pub expires_at: String,
}

const SESSION_COLUMNS: &str = "id, user_id, secret_hash, expires_at, created_at";

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new session.
    pub async fn create(&self, new_session: &NewSession) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions (user_id, secret_hash, expires_at, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(new_session.user_id)
        .bind(&new_session.secret_hash)
        .bind(&new_session.expires_at)
        .bind(datetime::now_db_string())
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }

    /// Get a valid (unexpired) session by secret hash.
    pub async fn get_valid(&self, secret_hash: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE secret_hash = $1 AND expires_at > $2"
        ))
        .bind(secret_hash)
        .bind(datetime::now_db_string())
        .fetch_optional(self.pool)
        .await?;

        Ok(session)
    }

    /// Delete a session by secret hash. Returns true if a row was removed.
    pub async fn delete(&self, secret_hash: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE secret_hash = $1")
            .bind(secret_hash)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user. Returns the number of rows removed.
    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete expired sessions. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(datetime::now_db_string())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
