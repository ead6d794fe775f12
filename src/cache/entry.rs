//! Cache entries shared by both stores.

use super::clock::age;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A stored value with its key and the time it was written.
///
/// Entries are immutable: a new write replaces the entry, it never edits it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The cached value
    pub value: T,

    /// When the value was stored
    pub stored_at: DateTime<Utc>,

    /// The key the value was stored under
    pub key: String,
}

impl<T> CacheEntry<T> {
    /// Create an entry stamped at `stored_at`.
    pub fn new(key: impl Into<String>, value: T, stored_at: DateTime<Utc>) -> Self {
        Self {
            value,
            stored_at,
            key: key.into(),
        }
    }

    /// Whether the entry is still valid for `ttl` at `now` (`now - stored_at < ttl`).
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        age(self.stored_at, now) < ttl
    }

    /// Unwrap the value.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Timestamp for a replacing write: never earlier than the entry it replaces.
pub(crate) fn next_stored_at(
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match previous {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}
