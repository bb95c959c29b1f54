//! Per-user language cache.
//!
//! Resolved language codes are cached per uid so the common path of a busy
//! fan-out performs no settings lookups. The cache is bounded and TTL-based:
//! capacity is derived from the user population once at startup and entries
//! expire 24 hours after their most recent insert. Process-local only — a
//! restart starts cold.

use std::time::Duration;

use moka::sync::Cache;

/// Minimum capacity, also used when the user count is unknown at startup.
const MIN_CAPACITY: u64 = 50;

/// Entry lifetime, measured from the most recent insert for that uid.
const ENTRY_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Bounded uid → language-code cache.
pub struct LanguageCache {
    entries: Cache<i64, String>,
}

impl LanguageCache {
    /// Build a cache sized for the given user population. Capacity is fixed
    /// here and never recomputed as the user base grows.
    pub fn new(total_users: Option<i64>) -> Self {
        Self::with_ttl(total_users, ENTRY_TTL)
    }

    fn with_ttl(total_users: Option<i64>, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(Self::capacity_for(total_users))
                .time_to_live(ttl)
                .build(),
        }
    }

    /// One slot per 20 users, never fewer than `MIN_CAPACITY`.
    pub fn capacity_for(total_users: Option<i64>) -> u64 {
        match total_users {
            Some(n) if n > 0 => MIN_CAPACITY.max(n as u64 / 20),
            _ => MIN_CAPACITY,
        }
    }

    /// Live entry for `uid`, or `None` when absent or expired.
    pub fn get(&self, uid: i64) -> Option<String> {
        self.entries.get(&uid)
    }

    /// Insert or refresh the entry for `uid`, resetting its TTL.
    pub fn insert(&self, uid: i64, language: String) {
        self.entries.insert(uid, language);
    }
}
