//! File metadata records and repository.

use super::kind::FileKind;
use crate::db::{DbPool, User};
use crate::datetime;
use crate::Result;

/// Metadata for a stored file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Row ID.
    pub id: i64,
    /// Display name (original filename).
    pub name: String,
    /// Kind classification (image/document/video/audio/other).
    pub kind: String,
    /// File extension.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Owning user's row ID.
    pub owner_id: i64,
    /// Owning user's public account ID (denormalized for fallback lookups).
    pub owner_account_id: String,
    /// Owning user's email (denormalized for fallback lookups).
    pub owner_email: String,
    /// Collaborator emails as a JSON array.
    pub collaborators: String,
    /// Stored blob name.
    pub stored_name: String,
    /// Upload timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl FileRecord {
    /// Kind classification as enum.
    pub fn file_kind(&self) -> FileKind {
        FileKind::parse(&self.kind).unwrap_or(FileKind::Other)
    }

    /// Parsed collaborator email list. Malformed JSON reads as empty.
    pub fn collaborator_emails(&self) -> Vec<String> {
        serde_json::from_str(&self.collaborators).unwrap_or_default()
    }

    /// Check whether a user owns this file.
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner_id == user.id
    }

    /// Check whether a user can read this file (owner or collaborator).
    pub fn is_accessible_by(&self, user: &User) -> bool {
        self.is_owned_by(user)
            || self
                .collaborator_emails()
                .iter()
                .any(|email| email.eq_ignore_ascii_case(&user.email))
    }
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Display name.
    pub name: String,
    /// Kind classification.
    pub kind: FileKind,
    /// File extension.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Owning user's row ID.
    pub owner_id: i64,
    /// Owning user's account ID.
    pub owner_account_id: String,
    /// Owning user's email.
    pub owner_email: String,
    /// Stored blob name.
    pub stored_name: String,
}

/// Builder for updating file metadata. Every update bumps `updated_at`.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New collaborator email list.
    pub collaborators: Option<Vec<String>>,
}

impl FileUpdate {
    /// Create a new FileUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the collaborator list.
    pub fn collaborators(mut self, emails: Vec<String>) -> Self {
        self.collaborators = Some(emails);
        self
    }
}

/// Sort order for file listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSort {
    /// Name, A to Z.
    NameAsc,
    /// Name, Z to A.
    NameDesc,
    /// Smallest first.
    SizeAsc,
    /// Largest first.
    SizeDesc,
    /// Oldest first.
    DateAsc,
    /// Newest first (default).
    #[default]
    DateDesc,
}

impl FileSort {
    /// Parse from the wire representation (e.g. `"name-asc"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name-asc" => Some(FileSort::NameAsc),
            "name-desc" => Some(FileSort::NameDesc),
            "size-asc" => Some(FileSort::SizeAsc),
            "size-desc" => Some(FileSort::SizeDesc),
            "date-asc" => Some(FileSort::DateAsc),
            "date-desc" => Some(FileSort::DateDesc),
            _ => None,
        }
    }

    /// ORDER BY clause for this sort. Values come from this whitelist only.
    fn order_clause(&self) -> &'static str {
        match self {
            FileSort::NameAsc => "name COLLATE NOCASE ASC, id ASC",
            FileSort::NameDesc => "name COLLATE NOCASE DESC, id DESC",
            FileSort::SizeAsc => "size ASC, id ASC",
            FileSort::SizeDesc => "size DESC, id DESC",
            FileSort::DateAsc => "created_at ASC, id ASC",
            FileSort::DateDesc => "created_at DESC, id DESC",
        }
    }
}

/// Query parameters for file listings.
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    /// Restrict to these kinds (empty means all).
    pub kinds: Vec<FileKind>,
    /// Name substring filter.
    pub search: Option<String>,
    /// Sort order.
    pub sort: FileSort,
    /// Maximum number of rows.
    pub limit: Option<i64>,
}

const FILE_COLUMNS: &str = "id, name, kind, extension, size, owner_id, owner_account_id, \
                            owner_email, collaborators, stored_name, created_at, updated_at";

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new file record.
    pub async fn create(&self, file: &NewFileRecord) -> Result<FileRecord> {
        let now = datetime::now_db_string();

        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "INSERT INTO files (name, kind, extension, size, owner_id, owner_account_id,
                                owner_email, collaborators, stored_name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, '[]', $8, $9, $9)
             RETURNING {FILE_COLUMNS}"
        ))
        .bind(&file.name)
        .bind(file.kind.as_str())
        .bind(&file.extension)
        .bind(file.size)
        .bind(file.owner_id)
        .bind(&file.owner_account_id)
        .bind(&file.owner_email)
        .bind(&file.stored_name)
        .bind(&now)
        .fetch_one(self.pool)
        .await?;

        Ok(record)
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// List files accessible to a user: owned by them, or carrying their
    /// email in the collaborator list.
    pub async fn list_accessible(&self, user: &User, query: &FileQuery) -> Result<Vec<FileRecord>> {
        // Collaborator emails are stored as a JSON array; matching the
        // quoted email substring is the containment check.
        let mut sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE (owner_id = $1 OR collaborators LIKE $2)"
        );
        let mut n = 3;

        if !query.kinds.is_empty() {
            let placeholders: Vec<String> = (0..query.kinds.len())
                .map(|i| format!("${}", n + i))
                .collect();
            sql.push_str(&format!(" AND kind IN ({})", placeholders.join(", ")));
            n += query.kinds.len();
        }

        if query.search.is_some() {
            sql.push_str(&format!(" AND name LIKE ${n}"));
            n += 1;
        }

        sql.push_str(&format!(" ORDER BY {}", query.sort.order_clause()));

        if query.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${n}"));
        }

        let mut q = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(user.id)
            .bind(format!("%\"{}\"%", user.email));

        for kind in &query.kinds {
            q = q.bind(kind.as_str());
        }
        if let Some(ref search) = query.search {
            q = q.bind(format!("%{search}%"));
        }
        if let Some(limit) = query.limit {
            q = q.bind(limit);
        }

        let records = q.fetch_all(self.pool).await?;
        Ok(records)
    }

    /// List every file owned by a user (for usage accounting).
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Total bytes stored by a user.
    pub async fn total_size_by_owner(&self, owner_id: i64) -> Result<i64> {
        let size: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(size), 0) FROM files WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(self.pool)
                .await?;

        Ok(size)
    }

    /// Update file metadata.
    pub async fn update(&self, id: i64, update: &FileUpdate) -> Result<Option<FileRecord>> {
        let mut sets = Vec::new();
        let mut n = 1;

        if update.name.is_some() {
            sets.push(format!("name = ${n}"));
            n += 1;
        }
        if update.collaborators.is_some() {
            sets.push(format!("collaborators = ${n}"));
            n += 1;
        }

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        sets.push(format!("updated_at = ${n}"));
        n += 1;

        let sql = format!("UPDATE files SET {} WHERE id = ${n}", sets.join(", "));

        let mut q = sqlx::query(&sql);
        if let Some(ref name) = update.name {
            q = q.bind(name);
        }
        if let Some(ref collaborators) = update.collaborators {
            let json = serde_json::to_string(collaborators)
                .map_err(|e| crate::DepotError::Validation(e.to_string()))?;
            q = q.bind(json);
        }
        q = q.bind(datetime::now_db_string()).bind(id);

        q.execute(self.pool).await?;

        self.get_by_id(id).await
    }

    /// Delete a file record. Returns true if a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
