//! Storage usage accounting.
//!
//! Folds a user's file records into per-kind byte totals and most-recent
//! update timestamps against a fixed quota. Each file counts exactly once,
//! in exactly one kind bucket.

use std::collections::HashMap;

use super::kind::FileKind;
use super::metadata::FileRecord;

/// Usage for a single file kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindUsage {
    /// Total bytes stored for this kind.
    pub size: i64,
    /// Number of files of this kind.
    pub count: i64,
    /// Update timestamp of the most recently updated file, if any.
    pub latest_date: Option<String>,
}

/// Aggregate usage summary for a user.
#[derive(Debug, Clone)]
pub struct UsageSummary {
    /// Per-kind usage.
    pub by_kind: HashMap<FileKind, KindUsage>,
    /// Total bytes used across all kinds.
    pub used: i64,
    /// Configured quota in bytes.
    pub quota: i64,
}

impl UsageSummary {
    /// Fold file records into a usage summary.
    pub fn from_records(records: &[FileRecord], quota: i64) -> Self {
        let mut by_kind: HashMap<FileKind, KindUsage> = HashMap::new();
        let mut used = 0;

        for record in records {
            let entry = by_kind.entry(record.file_kind()).or_default();
            entry.size += record.size;
            entry.count += 1;
            used += record.size;

            // DB timestamps sort lexicographically in time order.
            match &entry.latest_date {
                Some(latest) if *latest >= record.updated_at => {}
                _ => entry.latest_date = Some(record.updated_at.clone()),
            }
        }

        Self {
            by_kind,
            used,
            quota,
        }
    }

    /// Usage for a kind (zero if the user has no such files).
    pub fn kind(&self, kind: FileKind) -> KindUsage {
        self.by_kind.get(&kind).cloned().unwrap_or_default()
    }

    /// Remaining bytes before the quota is hit (never negative).
    pub fn remaining(&self) -> i64 {
        (self.quota - self.used).max(0)
    }
}
