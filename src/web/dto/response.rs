//! Response DTOs for the Depot web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::db::User;
use crate::file::{FileKind, KindUsage, ListedFile, OwnerInfo, UsageSummary};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// User information in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// Public account identifier.
    pub account_id: String,
    /// Email address.
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Account creation timestamp (RFC 3339).
    pub created_at: String,
}

impl UserResponse {
    /// Build from a user entity.
    pub fn from_user(user: &User) -> Self {
        Self {
            account_id: user.account_id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: to_rfc3339(&user.created_at),
        }
    }
}

/// Send-passcode response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SendPasscodeResponse {
    /// Pending account identifier to echo back on verification.
    pub account_id: String,
}

/// Session creation response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// The signed-in user.
    pub user: UserResponse,
}

/// Owner information attached to a file.
#[derive(Debug, Serialize, ToSchema)]
pub struct OwnerResponse {
    /// Public account identifier.
    pub account_id: String,
    /// Email address.
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Avatar URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl OwnerResponse {
    fn from_owner(owner: &OwnerInfo) -> Self {
        Self {
            account_id: owner.account_id.clone(),
            email: owner.email.clone(),
            full_name: owner.full_name.clone(),
            avatar_url: owner.avatar_url.clone(),
        }
    }
}

/// File information in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Kind classification.
    pub kind: String,
    /// File extension.
    pub extension: String,
    /// Size in bytes.
    pub size: i64,
    /// Download URL.
    pub url: String,
    /// Resolved owner; absent when resolution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerResponse>,
    /// Collaborator emails.
    pub collaborators: Vec<String>,
    /// Upload timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl FileResponse {
    /// Build from a listed file (record plus resolved owner).
    pub fn from_listed(listed: &ListedFile, base_url: &str) -> Self {
        let record = &listed.record;
        Self {
            id: record.id,
            name: record.name.clone(),
            kind: record.kind.clone(),
            extension: record.extension.clone(),
            size: record.size,
            url: download_url(base_url, record.id),
            owner: listed.owner.as_ref().map(OwnerResponse::from_owner),
            collaborators: record.collaborator_emails(),
            created_at: to_rfc3339(&record.created_at),
            updated_at: to_rfc3339(&record.updated_at),
        }
    }

    /// Build from a bare record with no owner resolution.
    pub fn from_record(record: &crate::file::FileRecord, base_url: &str) -> Self {
        Self::from_listed(
            &ListedFile {
                record: record.clone(),
                owner: None,
            },
            base_url,
        )
    }
}

/// Construct the public download URL for a file.
pub fn download_url(base_url: &str, id: i64) -> String {
    format!("{}/api/files/{}/download", base_url.trim_end_matches('/'), id)
}

/// Per-kind usage in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct KindUsageResponse {
    /// Kind name.
    pub kind: String,
    /// Total bytes stored for this kind.
    pub size: i64,
    /// Number of files of this kind.
    pub count: i64,
    /// Update timestamp of the most recent file (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_date: Option<String>,
}

impl KindUsageResponse {
    fn new(kind: FileKind, usage: &KindUsage) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            size: usage.size,
            count: usage.count,
            latest_date: usage.latest_date.as_deref().map(to_rfc3339),
        }
    }
}

/// Storage usage response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UsageResponse {
    /// Total bytes used.
    pub used: i64,
    /// Configured quota in bytes.
    pub quota: i64,
    /// Remaining bytes before the quota is hit.
    pub remaining: i64,
    /// Per-kind breakdown, one entry per kind (zeroes included).
    pub kinds: Vec<KindUsageResponse>,
}

impl UsageResponse {
    /// Build from a usage summary, emitting every kind bucket.
    pub fn from_summary(summary: &UsageSummary) -> Self {
        let kinds = FileKind::all()
            .into_iter()
            .map(|kind| KindUsageResponse::new(kind, &summary.kind(kind)))
            .collect();

        Self {
            used: summary.used,
            quota: summary.quota,
            remaining: summary.remaining(),
            kinds,
        }
    }
}
