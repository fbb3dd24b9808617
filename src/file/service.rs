//! High-level file operations.
//!
//! `FileService` ties the metadata repository and blob storage together:
//! upload (with blob rollback when the metadata insert fails), listing with
//! owner resolution, rename, collaborator updates, delete, download, and
//! usage accounting.

use futures::future::join_all;
use tracing::{error, warn};

use crate::db::{Database, User, UserRepository};
use crate::{DepotError, Result};

use super::kind::FileKind;
use super::metadata::{FileQuery, FileRecord, FileRepository, FileUpdate, NewFileRecord};
use super::storage::BlobStorage;
use super::usage::UsageSummary;
use super::{MAX_COLLABORATORS, MAX_FILENAME_LENGTH};

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Resolved owner information attached to a listed file.
#[derive(Debug, Clone)]
pub struct OwnerInfo {
    /// Public account identifier.
    pub account_id: String,
    /// Email address.
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

impl OwnerInfo {
    fn from_user(user: &User) -> Self {
        Self {
            account_id: user.account_id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// A file record with its owner resolved (when resolution succeeded).
#[derive(Debug, Clone)]
pub struct ListedFile {
    /// The file record.
    pub record: FileRecord,
    /// Resolved owner, if any lookup in the fallback chain succeeded.
    pub owner: Option<OwnerInfo>,
}

/// File service for managing uploads, sharing, and usage.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a BlobStorage,
    max_upload_bytes: u64,
    quota_bytes: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(
        db: &'a Database,
        storage: &'a BlobStorage,
        max_upload_bytes: u64,
        quota_bytes: u64,
    ) -> Self {
        Self {
            db,
            storage,
            max_upload_bytes,
            quota_bytes,
        }
    }

    /// Upload a file: write the blob, then create the metadata record.
    ///
    /// If the metadata insert fails the orphaned blob is deleted before the
    /// error is surfaced.
    pub async fn upload(&self, request: &UploadRequest, user: &User) -> Result<FileRecord> {
        if request.name.trim().is_empty() {
            return Err(DepotError::Validation("filename must not be empty".into()));
        }
        if request.name.chars().count() > MAX_FILENAME_LENGTH {
            return Err(DepotError::Validation(format!(
                "filename must be at most {MAX_FILENAME_LENGTH} characters"
            )));
        }
        if request.content.len() as u64 > self.max_upload_bytes {
            return Err(DepotError::Validation(format!(
                "file exceeds the maximum upload size of {} bytes",
                self.max_upload_bytes
            )));
        }

        let repo = FileRepository::new(self.db.pool());

        let used = repo.total_size_by_owner(user.id).await?;
        if used + request.content.len() as i64 > self.quota_bytes as i64 {
            return Err(DepotError::QuotaExceeded(format!(
                "upload would exceed the {} byte quota",
                self.quota_bytes
            )));
        }

        let extension = BlobStorage::extract_extension(&request.name).to_string();
        let kind = FileKind::from_extension(&extension);

        let stored_name = self.storage.save(&request.content, &request.name)?;

        let new_record = NewFileRecord {
            name: request.name.clone(),
            kind,
            extension,
            size: request.content.len() as i64,
            owner_id: user.id,
            owner_account_id: user.account_id.clone(),
            owner_email: user.email.clone(),
            stored_name: stored_name.clone(),
        };

        match repo.create(&new_record).await {
            Ok(record) => Ok(record),
            Err(e) => {
                error!("Metadata insert failed for {}: {}", stored_name, e);
                // Roll back the orphaned blob; the original error is what
                // the caller needs to see.
                if let Err(cleanup) = self.storage.delete(&stored_name) {
                    warn!("Blob rollback failed for {}: {}", stored_name, cleanup);
                }
                Err(e)
            }
        }
    }

    /// List files accessible to a user, resolving owners concurrently.
    ///
    /// One lookup chain runs per distinct owner; a chain that fails leaves
    /// that file's owner unresolved rather than failing the listing.
    pub async fn list(&self, user: &User, query: &FileQuery) -> Result<Vec<ListedFile>> {
        let repo = FileRepository::new(self.db.pool());
        let records = repo.list_accessible(user, query).await?;

        let mut owners: Vec<(i64, String, String)> = Vec::new();
        for record in &records {
            if !owners.iter().any(|(id, _, _)| *id == record.owner_id) {
                owners.push((
                    record.owner_id,
                    record.owner_account_id.clone(),
                    record.owner_email.clone(),
                ));
            }
        }

        let pool = self.db.pool();
        let resolutions = join_all(owners.iter().map(|(id, account_id, email)| async move {
            (*id, resolve_owner(pool, *id, account_id, email).await)
        }))
        .await;

        let listed = records
            .into_iter()
            .map(|record| {
                let owner = resolutions
                    .iter()
                    .find(|(id, _)| *id == record.owner_id)
                    .and_then(|(_, owner)| owner.clone());
                ListedFile { record, owner }
            })
            .collect();

        Ok(listed)
    }

    /// Get a file record, checking read access (owner or collaborator).
    pub async fn get_accessible(&self, user: &User, id: i64) -> Result<FileRecord> {
        let repo = FileRepository::new(self.db.pool());
        let record = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".into()))?;

        if !record.is_accessible_by(user) {
            return Err(DepotError::Permission("no access to this file".into()));
        }

        Ok(record)
    }

    /// Load a file's content for download.
    pub async fn download(&self, user: &User, id: i64) -> Result<(FileRecord, Vec<u8>)> {
        let record = self.get_accessible(user, id).await?;
        let content = self.storage.load(&record.stored_name)?;
        Ok((record, content))
    }

    /// Rename a file, preserving its extension. Owner only.
    pub async fn rename(&self, user: &User, id: i64, new_stem: &str) -> Result<FileRecord> {
        let record = self.owned_record(user, id).await?;

        let stem = new_stem.trim();
        if stem.is_empty() {
            return Err(DepotError::Validation("name must not be empty".into()));
        }

        let new_name = if record.extension.is_empty() {
            stem.to_string()
        } else {
            format!("{}.{}", stem, record.extension)
        };
        if new_name.chars().count() > MAX_FILENAME_LENGTH {
            return Err(DepotError::Validation(format!(
                "name must be at most {MAX_FILENAME_LENGTH} characters"
            )));
        }

        let repo = FileRepository::new(self.db.pool());
        repo.update(id, &FileUpdate::new().name(new_name))
            .await?
            .ok_or_else(|| DepotError::NotFound("file".into()))
    }

    /// Replace a file's collaborator email list. Owner only.
    ///
    /// Emails are normalized to lowercase and deduplicated; the owner's own
    /// email is dropped from the list.
    pub async fn update_collaborators(
        &self,
        user: &User,
        id: i64,
        emails: &[String],
    ) -> Result<FileRecord> {
        let record = self.owned_record(user, id).await?;

        let mut normalized: Vec<String> = Vec::new();
        for email in emails {
            let email = email.trim().to_lowercase();
            if email.is_empty() || email == record.owner_email {
                continue;
            }
            if !normalized.contains(&email) {
                normalized.push(email);
            }
        }

        if normalized.len() > MAX_COLLABORATORS {
            return Err(DepotError::Validation(format!(
                "at most {MAX_COLLABORATORS} collaborators per file"
            )));
        }

        let repo = FileRepository::new(self.db.pool());
        repo.update(id, &FileUpdate::new().collaborators(normalized))
            .await?
            .ok_or_else(|| DepotError::NotFound("file".into()))
    }

    /// Delete a file record and its blob. Owner only.
    ///
    /// The two removals are not atomic; a blob that fails to delete after
    /// the record is gone is logged and left for manual cleanup.
    pub async fn delete(&self, user: &User, id: i64) -> Result<()> {
        let record = self.owned_record(user, id).await?;

        let repo = FileRepository::new(self.db.pool());
        repo.delete(id).await?;

        match self.storage.delete(&record.stored_name) {
            Ok(true) => {}
            Ok(false) => warn!("Blob {} was already gone", record.stored_name),
            Err(e) => warn!("Failed to delete blob {}: {}", record.stored_name, e),
        }

        Ok(())
    }

    /// Aggregate usage for a user's own files against the quota.
    pub async fn usage(&self, user: &User) -> Result<UsageSummary> {
        let repo = FileRepository::new(self.db.pool());
        let records = repo.list_by_owner(user.id).await?;
        Ok(UsageSummary::from_records(
            &records,
            self.quota_bytes as i64,
        ))
    }

    /// Fetch a record and require ownership.
    async fn owned_record(&self, user: &User, id: i64) -> Result<FileRecord> {
        let repo = FileRepository::new(self.db.pool());
        let record = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".into()))?;

        if !record.is_owned_by(user) {
            return Err(DepotError::Permission("only the owner may do that".into()));
        }

        Ok(record)
    }
}

/// Resolve a file's owner, trying the direct row reference first, then the
/// denormalized account id, then the email. Every failure is swallowed;
/// `None` means the owner stays unresolved.
async fn resolve_owner(
    pool: &crate::db::DbPool,
    owner_id: i64,
    account_id: &str,
    email: &str,
) -> Option<OwnerInfo> {
    let repo = UserRepository::new(pool);

    if let Ok(Some(user)) = repo.get_by_id(owner_id).await {
        return Some(OwnerInfo::from_user(&user));
    }
    if let Ok(Some(user)) = repo.get_by_account_id(account_id).await {
        return Some(OwnerInfo::from_user(&user));
    }
    if let Ok(Some(user)) = repo.get_by_email(email).await {
        return Some(OwnerInfo::from_user(&user));
    }

    None
}
