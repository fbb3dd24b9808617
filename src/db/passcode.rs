//! Pending passcode repository for email sign-in.
//!
//! A passcode row holds the SHA-256 hash of a one-time code sent to the
//! user's email. Codes are single-use, expiring, and attempt-limited.

use super::DbPool;
use crate::datetime;
use crate::Result;

/// Pending passcode entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Passcode {
    /// Row ID.
    pub id: i64,
    /// User the code was issued for.
    pub user_id: i64,
    /// SHA-256 hash of the code.
    pub code_hash: String,
    /// Failed verification attempts so far.
    pub attempts: i64,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Consumption timestamp (None while pending).
    pub consumed_at: Option<String>,
}

impl Passcode {
    /// Check if the code has been consumed.
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

/// New passcode for creation.
#[derive(Debug, Clone)]
pub struct NewPasscode {
    /// User the code is issued for.
    pub user_id: i64,
    /// SHA-256 hash of the code.
    pub code_hash: String,
    /// Expiration timestamp.
    pub expires_at: String,
}

const PASSCODE_COLUMNS: &str =
    "id, user_id, code_hash, attempts, expires_at, created_at, consumed_at";

/// Repository for passcode operations.
pub struct PasscodeRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PasscodeRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new passcode, replacing any previous pending code for the
    /// same user.
    pub async fn create(&self, new_passcode: &NewPasscode) -> Result<Passcode> {
        sqlx::query("DELETE FROM passcodes WHERE user_id = $1")
            .bind(new_passcode.user_id)
            .execute(self.pool)
            .await?;

        let passcode = sqlx::query_as::<_, Passcode>(&format!(
            "INSERT INTO passcodes (user_id, code_hash, expires_at, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {PASSCODE_COLUMNS}"
        ))
        .bind(new_passcode.user_id)
        .bind(&new_passcode.code_hash)
        .bind(&new_passcode.expires_at)
        .bind(datetime::now_db_string())
        .fetch_one(self.pool)
        .await?;

        Ok(passcode)
    }

    /// Atomically consume a matching, unexpired, under-attempt-limit
    /// passcode.
    ///
    /// Returns the consumed row on success; `None` means the code didn't
    /// match, expired, exceeded the attempt limit, or was already used. The
    /// single UPDATE keeps concurrent verifications from both succeeding.
    pub async fn consume(
        &self,
        user_id: i64,
        code_hash: &str,
        max_attempts: u32,
    ) -> Result<Option<Passcode>> {
        let now = datetime::now_db_string();

        let passcode = sqlx::query_as::<_, Passcode>(&format!(
            "UPDATE passcodes
             SET consumed_at = $1
             WHERE user_id = $2
               AND code_hash = $3
               AND consumed_at IS NULL
               AND attempts < $4
               AND expires_at > $5
             RETURNING {PASSCODE_COLUMNS}"
        ))
        .bind(&now)
        .bind(user_id)
        .bind(code_hash)
        .bind(max_attempts as i64)
        .bind(&now)
        .fetch_optional(self.pool)
        .await?;

        Ok(passcode)
    }

    /// Record a failed verification attempt against the user's pending
    /// passcode.
    ///
    /// Returns the attempt count after the increment, or `None` if no
    /// pending passcode exists.
    pub async fn record_failed_attempt(&self, user_id: i64) -> Result<Option<i64>> {
        let attempts: Option<i64> = sqlx::query_scalar(
            "UPDATE passcodes
             SET attempts = attempts + 1
             WHERE user_id = $1 AND consumed_at IS NULL
             RETURNING attempts",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(attempts)
    }

    /// Get the pending passcode for a user, if any.
    pub async fn get_pending(&self, user_id: i64) -> Result<Option<Passcode>> {
        let passcode = sqlx::query_as::<_, Passcode>(&format!(
            "SELECT {PASSCODE_COLUMNS} FROM passcodes
             WHERE user_id = $1 AND consumed_at IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(passcode)
    }

    /// Delete expired passcodes. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM passcodes WHERE expires_at <= $1")
            .bind(datetime::now_db_string())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, NewUser, UserRepository};

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("p@example.com", "P"))
            .await
            .unwrap();
        (db, user.id)
    }

    fn new_code(user_id: i64, hash: &str, expires_at: &str) -> NewPasscode {
        NewPasscode {
            user_id,
            code_hash: hash.to_string(),
            expires_at: expires_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_replaces_previous() {
        let (db, user_id) = setup().await;
        let repo = PasscodeRepository::new(db.pool());
        let expires = datetime::db_string_after_secs(600);

        repo.create(&new_code(user_id, "hash-one", &expires))
            .await
            .unwrap();
        repo.create(&new_code(user_id, "hash-two", &expires))
            .await
            .unwrap();

        let pending = repo.get_pending(user_id).await.unwrap().unwrap();
        assert_eq!(pending.code_hash, "hash-two");
        assert!(repo
            .consume(user_id, "hash-one", 5)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let (db, user_id) = setup().await;
        let repo = PasscodeRepository::new(db.pool());
        let expires = datetime::db_string_after_secs(600);

        repo.create(&new_code(user_id, "hash", &expires))
            .await
            .unwrap();

        let first = repo.consume(user_id, "hash", 5).await.unwrap();
        assert!(first.is_some());
        assert!(first.unwrap().is_consumed());

        let second = repo.consume(user_id, "hash", 5).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_consume_rejects_expired() {
        let (db, user_id) = setup().await;
        let repo = PasscodeRepository::new(db.pool());

        repo.create(&new_code(user_id, "hash", "2000-01-01 00:00:00"))
            .await
            .unwrap();

        assert!(repo.consume(user_id, "hash", 5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attempt_limit_invalidates() {
        let (db, user_id) = setup().await;
        let repo = PasscodeRepository::new(db.pool());
        let expires = datetime::db_string_after_secs(600);

        repo.create(&new_code(user_id, "hash", &expires))
            .await
            .unwrap();

        for expected in 1..=3 {
            let attempts = repo
                .record_failed_attempt(user_id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(attempts, expected);
        }

        // Limit of 3 reached; even the right code no longer verifies.
        assert!(repo.consume(user_id, "hash", 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (db, user_id) = setup().await;
        let repo = PasscodeRepository::new(db.pool());

        repo.create(&new_code(user_id, "hash", "2000-01-01 00:00:00"))
            .await
            .unwrap();

        let removed = repo.purge_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.get_pending(user_id).await.unwrap().is_none());
    }
}
