//! User entity and repository.

use uuid::Uuid;

use super::DbPool;
use crate::datetime;
use crate::Result;

/// User entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Internal row ID.
    pub id: i64,
    /// Stable public account identifier (UUID).
    pub account_id: String,
    /// Email address (unique, lowercased).
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

impl NewUser {
    /// Create a new NewUser. The email is normalized to lowercase.
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            full_name: full_name.into(),
            avatar_url: None,
        }
    }

    /// Set the avatar URL.
    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// Builder for updating user fields.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New full name.
    pub full_name: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<Option<String>>,
}

impl UserUpdate {
    /// Create a new UserUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full name.
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Set the avatar URL.
    pub fn avatar_url(mut self, url: Option<impl Into<String>>) -> Self {
        self.avatar_url = Some(url.map(|u| u.into()));
        self
    }
}

const USER_COLUMNS: &str =
    "id, account_id, email, full_name, avatar_url, created_at, updated_at";

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a fresh account identifier.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let account_id = Uuid::new_v4().to_string();
        let now = datetime::now_db_string();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (account_id, email, full_name, avatar_url, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING id",
        )
        .bind(&account_id)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(&new_user.avatar_url)
        .bind(&now)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| crate::DepotError::NotFound("user".into()))
    }

    /// Get a user by internal row ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by public account identifier.
    pub async fn get_by_account_id(&self, account_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_id = $1"
        ))
        .bind(account_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by email (case-insensitive; emails are stored lowercased).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Update user fields.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        let mut sets = Vec::new();
        let mut n = 1;

        if update.full_name.is_some() {
            sets.push(format!("full_name = ${n}"));
            n += 1;
        }
        if update.avatar_url.is_some() {
            sets.push(format!("avatar_url = ${n}"));
            n += 1;
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        sets.push(format!("updated_at = ${n}"));
        n += 1;

        let sql = format!("UPDATE users SET {} WHERE id = ${n}", sets.join(", "));

        let mut query = sqlx::query(&sql);
        if let Some(ref full_name) = update.full_name {
            query = query.bind(full_name);
        }
        if let Some(ref avatar_url) = update.avatar_url {
            query = query.bind(avatar_url);
        }
        query = query.bind(datetime::now_db_string()).bind(id);

        query.execute(self.pool).await?;

        self.get_by_id(id).await
    }
}
