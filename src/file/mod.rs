//! File management module for Depot.
//!
//! This module provides file storage functionality including:
//! - Kind classification (image/document/video/audio/other)
//! - Metadata records with owner and collaborator references
//! - Blob storage with UUID naming
//! - High-level upload/list/share/delete operations

mod kind;
mod metadata;
mod service;
mod storage;
mod usage;

pub use kind::FileKind;
pub use metadata::{
    FileQuery, FileRecord, FileRepository, FileSort, FileUpdate, NewFileRecord,
};
pub use service::{FileService, ListedFile, OwnerInfo, UploadRequest};
pub use storage::BlobStorage;
pub use usage::{KindUsage, UsageSummary};

/// Maximum length for a file display name (in characters).
pub const MAX_FILENAME_LENGTH: usize = 100;

/// Maximum number of collaborators on a single file.
pub const MAX_COLLABORATORS: usize = 100;
