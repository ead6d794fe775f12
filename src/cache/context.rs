//! Composition root for the cache layer.
//!
//! One [`CacheContext`] owns every store, in-flight registry, TTL policy and
//! metrics handle. The application builds it once and hands clones to the
//! services; tests build a fresh one each, so nothing leaks between them.

use super::clock::{Clock, SystemClock};
use super::coalescer::Coalescer;
use super::medium::{DurableMedium, FileMedium, MemoryMedium};
use super::persistent::PersistentStore;
use super::volatile::VolatileStore;
use crate::config::{Config, TtlPolicy};
use crate::error::FetchError;
use crate::models::quote::QUOTE_TAG;
use crate::models::{Quote, TokenMetadata, TokenPrice};
use crate::observability::CacheMetrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Record class of persisted token metadata.
pub const TOKEN_METADATA_CLASS: &str = "token";

/// All cache state for one application session.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CacheContext {
    /// Fast quote class
    pub quotes: VolatileStore<Quote>,

    /// Subgraph price class
    pub prices: VolatileStore<TokenPrice>,

    /// Persisted token metadata class
    pub token_metadata: PersistentStore<TokenMetadata>,

    /// In-flight quote fetches
    pub quote_flights: Coalescer<Quote, FetchError>,

    /// In-flight price fetches
    pub price_flights: Coalescer<TokenPrice, FetchError>,

    /// In-flight metadata fetches
    pub metadata_flights: Coalescer<TokenMetadata, FetchError>,

    /// TTL per request class
    pub ttl: TtlPolicy,

    /// Shared counters
    pub metrics: CacheMetrics,

    clock: Arc<dyn Clock>,
    chain_epoch: Arc<AtomicU64>,
}

impl CacheContext {
    /// Build a context over an explicit medium and clock.
    pub fn new(config: &Config, medium: Arc<dyn DurableMedium>, clock: Arc<dyn Clock>) -> Self {
        let ttl = config.ttl_policy();

        Self {
            quotes: VolatileStore::with_clock(config.volatile_max_entries, clock.clone()),
            prices: VolatileStore::with_clock(config.volatile_max_entries, clock.clone()),
            token_metadata: PersistentStore::with_clock(
                medium,
                &config.cache_namespace,
                TOKEN_METADATA_CLASS,
                ttl.token_metadata,
                clock.clone(),
            ),
            quote_flights: Coalescer::new(),
            price_flights: Coalescer::new(),
            metadata_flights: Coalescer::new(),
            ttl,
            metrics: CacheMetrics::new(),
            clock,
            chain_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build a context persisting to the configured cache file.
    pub fn from_config(config: &Config) -> Self {
        let medium = Arc::new(FileMedium::new(config.cache_file.clone()));
        Self::new(config, medium, Arc::new(SystemClock))
    }

    /// Build a context whose "persistent" store lives in memory only.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(config, Arc::new(MemoryMedium::new()), Arc::new(SystemClock))
    }

    /// The clock stores are stamped with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Number of chain state changes seen so far.
    ///
    /// A fetch started under one epoch must not write back under another.
    pub fn chain_epoch(&self) -> u64 {
        self.chain_epoch.load(Ordering::SeqCst)
    }

    /// Force every quote and price stale after a transaction changed chain state.
    ///
    /// Quote and price fetches still in flight are detached: their current
    /// waiters get the pre-transaction result, nothing is cached from them,
    /// and later callers start a fresh fetch. Token metadata is unaffected.
    /// Returns how many entries were dropped.
    pub fn on_chain_state_changed(&self) -> usize {
        self.chain_epoch.fetch_add(1, Ordering::SeqCst);
        let detached = self.quote_flights.forget_all() + self.price_flights.forget_all();

        let quote_prefix = format!("{}:", QUOTE_TAG);
        let quotes = self.quotes.invalidate_by_prefix(&quote_prefix);
        let prices = self.prices.invalidate_by_prefix(&TokenPrice::key_prefix());

        self.metrics.track_invalidation("quote", quotes);
        self.metrics.track_invalidation("price", prices);
        tracing::info!(
            quotes,
            prices,
            detached,
            "Chain state changed, dropped cached quotes and prices"
        );

        quotes + prices
    }

    /// Drop every in-memory entry. Persisted records are kept.
    pub fn clear_volatile(&self) {
        self.quotes.clear();
        self.prices.clear();
    }
}

impl std::fmt::Debug for CacheContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheContext")
            .field("quotes", &self.quotes)
            .field("prices", &self.prices)
            .field("token_metadata", &self.token_metadata)
            .field("ttl", &self.ttl)
            .finish()
    }
}
