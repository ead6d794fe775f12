//! Durable store for long-lived, low-churn records.
//!
//! Same shape as the volatile store, but the TTL is fixed per record class and
//! the backing medium lives outside process memory. Durability is an
//! optimization, never a correctness requirement: the public API swallows
//! every medium failure (reads become misses, writes become no-ops). The
//! `try_*` variants expose the failure path for callers that want to see it.

use super::clock::{Clock, SystemClock};
use super::entry::{next_stored_at, CacheEntry};
use super::keys::DELIMITER;
use super::medium::DurableMedium;
use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a persistent lookup before storage errors are collapsed.
#[derive(Debug)]
pub enum StoreLookup<T> {
    /// A fresh entry was found
    Hit(CacheEntry<T>),

    /// No entry, or the entry is past its TTL
    Miss,

    /// The medium failed or returned data that could not be decoded
    StorageError(StorageError),
}

impl<T> StoreLookup<T> {
    /// Collapse into the public contract: storage errors read as misses.
    pub fn into_entry(self) -> Option<CacheEntry<T>> {
        match self {
            StoreLookup::Hit(entry) => Some(entry),
            StoreLookup::Miss | StoreLookup::StorageError(_) => None,
        }
    }

    /// Whether this lookup was a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, StoreLookup::Hit(_))
    }
}

/// On-medium record layout: the value's own fields plus `storedAt` (epoch ms).
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedRecord<V> {
    #[serde(flatten)]
    value: V,
    stored_at: i64,
}

/// Only the timestamp of a record, for monotonic rewrites.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStamp {
    stored_at: i64,
}

/// A typed, namespaced, fail-soft view over a [`DurableMedium`].
pub struct PersistentStore<T> {
    medium: Arc<dyn DurableMedium>,
    prefix: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PersistentStore<T> {
    fn clone(&self) -> Self {
        Self {
            medium: self.medium.clone(),
            prefix: self.prefix.clone(),
            ttl: self.ttl,
            clock: self.clock.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store for one record class.
    ///
    /// Records are stored under `<namespace>:<class>:<id>`, which keeps them
    /// apart from volatile keys and from other classes on the same medium.
    pub fn new(
        medium: Arc<dyn DurableMedium>,
        namespace: &str,
        class: &str,
        ttl: Duration,
    ) -> Self {
        Self::with_clock(medium, namespace, class, ttl, Arc::new(SystemClock))
    }

    /// Create a store that reads time from `clock`.
    pub fn with_clock(
        medium: Arc<dyn DurableMedium>,
        namespace: &str,
        class: &str,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            medium,
            prefix: format!("{namespace}{DELIMITER}{class}{DELIMITER}"),
            ttl,
            clock,
            _marker: PhantomData,
        }
    }

    /// The fixed TTL of this record class.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Namespace prefix shared by every record of this store.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Look up `id`, reporting storage failures instead of hiding them.
    pub fn try_get(&self, id: &str) -> StoreLookup<T> {
        let raw = match self.medium.read_raw(&self.namespaced(id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoreLookup::Miss,
            Err(e) => return StoreLookup::StorageError(e),
        };

        let entry = match decode::<T>(id, &raw) {
            Ok(entry) => entry,
            Err(e) => return StoreLookup::StorageError(e),
        };

        if entry.is_fresh(self.ttl, self.clock.now()) {
            StoreLookup::Hit(entry)
        } else {
            StoreLookup::Miss
        }
    }

    /// Look up `id`. Any storage failure reads as a miss.
    pub fn get(&self, id: &str) -> Option<CacheEntry<T>> {
        match self.try_get(id) {
            StoreLookup::StorageError(e) => {
                tracing::warn!(id = %id, error = %e, "Persistent cache read failed, treating as miss");
                None
            }
            lookup => lookup.into_entry(),
        }
    }

    /// Store `value` under `id`, reporting storage failures.
    pub fn try_set(&self, id: &str, value: &T) -> StorageResult<()> {
        let key = self.namespaced(id);

        // A missing or unreadable previous record just means no floor
        let previous = self
            .medium
            .read_raw(&key)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<PersistedStamp>(&raw).ok())
            .and_then(|stamp| from_millis(stamp.stored_at));

        let stored_at = next_stored_at(previous, self.clock.now());
        let record = PersistedRecord {
            value,
            stored_at: stored_at.timestamp_millis(),
        };

        let raw = serde_json::to_string(&record)?;
        self.medium.write_raw(&key, &raw)
    }

    /// Store `value` under `id`. Storage failures are logged and dropped.
    pub fn set(&self, id: &str, value: &T) {
        if let Err(e) = self.try_set(id, value) {
            tracing::warn!(id = %id, error = %e, "Persistent cache write failed, skipping");
        }
    }

    /// Remove the record for `id`. Returns whether a record was removed.
    pub fn invalidate(&self, id: &str) -> bool {
        let key = self.namespaced(id);

        match self.medium.read_raw(&key) {
            Ok(Some(_)) => {}
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Persistent cache read failed");
                return false;
            }
        }

        match self.medium.remove_raw(&key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Persistent cache eviction failed");
                false
            }
        }
    }

    /// Remove every record whose id starts with `prefix`. Returns how many were removed.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let full_prefix = self.namespaced(prefix);
        self.remove_where(|key| key.starts_with(&full_prefix))
    }

    /// Remove every record of this store. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let prefix = self.prefix.clone();
        self.remove_where(|key| key.starts_with(&prefix))
    }

    /// Every decodable record of this store, fresh or stale, ordered by id.
    pub fn entries(&self) -> Vec<CacheEntry<T>> {
        let mut entries = Vec::new();

        for key in self.own_keys() {
            let id = &key[self.prefix.len()..];
            match self.medium.read_raw(&key) {
                Ok(Some(raw)) => match decode::<T>(id, &raw) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => tracing::debug!(id = %id, error = %e, "Skipping undecodable record"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(id = %id, error = %e, "Persistent cache read failed"),
            }
        }

        entries
    }

    /// Remove stale and undecodable records. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        for key in self.own_keys() {
            let id = &key[self.prefix.len()..];
            let keep = match self.medium.read_raw(&key) {
                Ok(Some(raw)) => decode::<T>(id, &raw)
                    .map(|entry| entry.is_fresh(self.ttl, now))
                    .unwrap_or(false),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "Persistent cache read failed");
                    continue;
                }
            };

            if !keep && self.medium.remove_raw(&key).is_ok() {
                removed += 1;
            }
        }

        removed
    }

    fn namespaced(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    fn own_keys(&self) -> Vec<String> {
        match self.medium.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|key| key.starts_with(&self.prefix))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Persistent cache key listing failed");
                Vec::new()
            }
        }
    }

    fn remove_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let keys = match self.medium.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "Persistent cache key listing failed");
                return 0;
            }
        };

        keys.iter()
            .filter(|key| predicate(key))
            .filter(|key| match self.medium.remove_raw(key) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Persistent cache eviction failed");
                    false
                }
            })
            .count()
    }
}

impl<T> std::fmt::Debug for PersistentStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .finish()
    }
}

fn decode<T: DeserializeOwned>(id: &str, raw: &str) -> StorageResult<CacheEntry<T>> {
    let record: PersistedRecord<T> = serde_json::from_str(raw)?;
    let stored_at = from_millis(record.stored_at).ok_or_else(|| {
        StorageError::Unavailable(format!("record timestamp out of range: {}", record.stored_at))
    })?;
    Ok(CacheEntry::new(id, record.value, stored_at))
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}
