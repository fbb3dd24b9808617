//! Database module for Depot.
//!
//! SQLite connectivity via sqlx, sequential migrations, and a startup
//! compatibility probe that patches databases created by older builds.

mod passcode;
mod schema;
mod session;
mod user;

pub use passcode::{NewPasscode, Passcode, PasscodeRepository};
pub use schema::{COMPAT_COLUMNS, MIGRATIONS};
pub use session::{NewSession, Session, SessionRepository};
pub use user::{NewUser, User, UserRepository, UserUpdate};

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

use crate::Result;

/// Connection pool type used by all repositories.
pub type DbPool = sqlx::SqlitePool;

/// Database wrapper for managing connections and migrations.
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open a database at the specified path.
    ///
    /// The file and parent directories are created if missing, and pending
    /// migrations are applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        db.ensure_compat_columns().await?;

        Ok(db)
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory database");

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| crate::DepotError::Database(e.to_string()))?
            .foreign_keys(true);

        // A single connection keeps every caller on the same in-memory
        // database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        db.ensure_compat_columns().await?;

        Ok(db)
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Get the current schema version.
    pub async fn schema_version(&self) -> Result<i64> {
        let table_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        )
        .fetch_one(&self.pool)
        .await?;

        if !table_exists {
            return Ok(0);
        }

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;

        Ok(version)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)")
            .execute(&self.pool)
            .await?;

        let current_version = self.schema_version().await?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i64;
            if version <= current_version {
                continue;
            }

            debug!("Applying migration v{}", version);
            sqlx::raw_sql(migration).execute(&self.pool).await?;
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(version)
                .execute(&self.pool)
                .await?;
        }

        let final_version = self.schema_version().await?;
        if final_version > current_version {
            info!(
                "Database migrated from v{} to v{}",
                current_version, final_version
            );
        }

        Ok(())
    }

    /// Probe the live table layout and add late-added optional columns that
    /// are missing.
    ///
    /// Databases created by older builds predate some columns; rather than
    /// fail on the first query that touches one, patch the schema up front.
    pub async fn ensure_compat_columns(&self) -> Result<()> {
        for (table, column, alter) in COMPAT_COLUMNS {
            if !self.column_exists(table, column).await? {
                info!("Adding missing column {}.{}", table, column);
                sqlx::raw_sql(alter).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    /// Check whether a column exists on a table.
    async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        // PRAGMA table_info doesn't take bind parameters; table names come
        // from the static COMPAT_COLUMNS list, never from user input.
        let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().any(|row| {
            row.try_get::<String, _>("name")
                .map(|name| name == column)
                .unwrap_or(false)
        }))
    }
}
