//! In-memory cache for short-code redirect lookups.
//!
//! Uses `moka` for lock-free concurrent caching with TTL support.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Application cache of short code to long URL
#[derive(Clone)]
pub struct AppCache {
    redirects: Arc<Cache<String, String>>,
}

impl AppCache {
    /// Create a new AppCache with the specified settings
    pub fn new(ttl_secs: u64, max_capacity: u64) -> Self {
        let redirects = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redirects: Arc::new(redirects),
        }
    }

    /// Insert a long URL for a short code
    pub fn insert(&self, short_code: &str, long_url: &str) {
        self.redirects
            .insert(short_code.to_string(), long_url.to_string());
    }

    /// Get the long URL for a short code
    pub fn get(&self, short_code: &str) -> Option<String> {
        self.redirects.get(short_code)
    }

    /// Forget a short code, e.g. after its link was removed
    pub fn invalidate(&self, short_code: &str) {
        self.redirects.invalidate(short_code);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(
            300,    // TTL: 5 minutes
            10_000, // max capacity
        )
    }
}
