//! Date/time utilities for Depot.
//!
//! Timestamps are stored in the database as UTC strings in SQLite format
//! (`YYYY-MM-DD HH:MM:SS`). That format sorts lexicographically in time
//! order, which the usage summary relies on.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Storage format for database timestamps.
pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in database format.
pub fn now_db_string() -> String {
    Utc::now().format(DB_FORMAT).to_string()
}

/// UTC time `secs` seconds from now, in database format.
pub fn db_string_after_secs(secs: u64) -> String {
    (Utc::now() + Duration::seconds(secs as i64))
        .format(DB_FORMAT)
        .to_string()
}

/// Parse a database timestamp string back into a UTC datetime.
pub fn parse_db_string(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, DB_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Convert a database timestamp string to RFC 3339 for API responses.
///
/// Returns the original string if it doesn't parse.
pub fn to_rfc3339(s: &str) -> String {
    match parse_db_string(s) {
        Some(dt) => dt.to_rfc3339(),
        None => s.to_string(),
    }
}
