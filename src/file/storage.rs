//! Blob storage for Depot.
//!
//! Stores uploaded bytes under UUID-based names, sharded by the first two
//! characters of the name:
//!
//! ```text
//! {base_path}/
//! ├── ab/
//! │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
//! └── cd/
//!     └── cd90ab12-3456-7890-abcd-ef1234567890.bin
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{DepotError, Result};

/// Blob storage service for managing stored file bytes.
#[derive(Debug, Clone)]
pub struct BlobStorage {
    /// Base directory for blob storage.
    base_path: PathBuf,
}

impl BlobStorage {
    /// Create a new BlobStorage with the given base path.
    ///
    /// The base directory is created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Save content under a new UUID-based name.
    ///
    /// Returns the stored name (`{uuid}.{ext}`), with the extension taken
    /// from the original filename.
    pub fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let stored_name = Self::generate_stored_name(original_name);
        self.save_with_name(content, &stored_name)?;
        Ok(stored_name)
    }

    /// Save content under a specific stored name.
    pub fn save_with_name(&self, content: &[u8], stored_name: &str) -> Result<()> {
        let file_path = self.blob_path(stored_name);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&file_path, content)?;

        Ok(())
    }

    /// Load a blob's content.
    pub fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        let file_path = self.blob_path(stored_name);

        match fs::read(&file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(format!("blob {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob.
    ///
    /// Returns `true` if the blob existed.
    pub fn delete(&self, stored_name: &str) -> Result<bool> {
        let file_path = self.blob_path(stored_name);

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.blob_path(stored_name).exists()
    }

    /// Get the size of a stored blob.
    pub fn blob_size(&self, stored_name: &str) -> Result<u64> {
        match fs::metadata(self.blob_path(stored_name)) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound(format!("blob {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get the full on-disk path for a stored name.
    pub fn blob_path(&self, stored_name: &str) -> PathBuf {
        let shard = Self::shard(stored_name);
        self.base_path.join(shard).join(stored_name)
    }

    /// Shard directory for a stored name (first two characters).
    fn shard(stored_name: &str) -> &str {
        if stored_name.len() >= 2 {
            &stored_name[..2]
        } else {
            stored_name
        }
    }

    /// Extract the file extension from a filename.
    ///
    /// Returns "bin" when no extension is present.
    pub fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin")
    }

    /// Generate a new UUID-based stored name preserving the extension.
    pub fn generate_stored_name(original_name: &str) -> String {
        let uuid = Uuid::new_v4();
        let ext = Self::extract_extension(original_name);
        format!("{uuid}.{ext}")
    }
}
