//! Route revalidation signal.
//!
//! Every mutation bumps a generation counter for the route paths whose
//! rendered data it invalidates. Read responses carry the current
//! generation in an `x-route-version` header so cached pages can detect
//! staleness without re-fetching bodies.

use std::collections::HashMap;
use std::sync::Mutex;

/// Header carrying a route's current generation.
pub const ROUTE_VERSION_HEADER: &str = "x-route-version";

/// Route key for file listings.
pub const FILES_ROUTE: &str = "/files";

/// Route key for the usage summary.
pub const USAGE_ROUTE: &str = "/usage";

/// Per-route generation counters.
#[derive(Debug, Default)]
pub struct RouteVersions {
    versions: Mutex<HashMap<String, u64>>,
}

impl RouteVersions {
    /// Create a new counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump a route's generation. Returns the new value.
    pub fn bump(&self, path: &str) -> u64 {
        let mut versions = self.versions.lock().unwrap();
        let entry = versions.entry(path.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// The current generation for a route (0 if never bumped).
    pub fn get(&self, path: &str) -> u64 {
        self.versions
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}
