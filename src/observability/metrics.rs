//! Cache metrics tracking.
//!
//! Counters for hits, misses, backend fetches and coalesced joins, shared by
//! every service built from the same cache context.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Metrics tracker for the cache layer.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    cache_hits_total: Arc<AtomicU64>,
    cache_misses_total: Arc<AtomicU64>,
    fetches_total: Arc<AtomicU64>,
    fetch_errors_total: Arc<AtomicU64>,
    coalesced_total: Arc<AtomicU64>,
    invalidations_total: Arc<AtomicU64>,
}

impl CacheMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            cache_hits_total: Arc::new(AtomicU64::new(0)),
            cache_misses_total: Arc::new(AtomicU64::new(0)),
            fetches_total: Arc::new(AtomicU64::new(0)),
            fetch_errors_total: Arc::new(AtomicU64::new(0)),
            coalesced_total: Arc::new(AtomicU64::new(0)),
            invalidations_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Track a store lookup.
    pub fn track_cache_access(&self, class: &str, key: &str, hit: bool) {
        if hit {
            self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(class = %class, key = %key, "Cache hit");
        } else {
            self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(class = %class, key = %key, "Cache miss");
        }
    }

    /// Track a producer call made on a miss.
    pub fn track_fetch(&self, class: &str, duration_ms: u128, success: bool) {
        self.fetches_total.fetch_add(1, Ordering::Relaxed);

        if !success {
            self.fetch_errors_total.fetch_add(1, Ordering::Relaxed);
        }

        tracing::debug!(
            class = %class,
            duration_ms = duration_ms,
            success = success,
            "Backend fetch completed"
        );
    }

    /// Track a miss that joined an already running fetch.
    pub fn track_coalesced(&self, class: &str) {
        self.coalesced_total.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(class = %class, "Joined in-flight fetch");
    }

    /// Track entries removed by explicit invalidation.
    pub fn track_invalidation(&self, class: &str, removed: usize) {
        self.invalidations_total
            .fetch_add(removed as u64, Ordering::Relaxed);
        tracing::debug!(class = %class, removed = removed, "Cache invalidated");
    }

    /// Get the total number of cache hits.
    pub fn cache_hits_total(&self) -> u64 {
        self.cache_hits_total.load(Ordering::Relaxed)
    }

    /// Get the total number of cache misses.
    pub fn cache_misses_total(&self) -> u64 {
        self.cache_misses_total.load(Ordering::Relaxed)
    }

    /// Get the total number of backend fetches.
    pub fn fetches_total(&self) -> u64 {
        self.fetches_total.load(Ordering::Relaxed)
    }

    /// Get the total number of failed backend fetches.
    pub fn fetch_errors_total(&self) -> u64 {
        self.fetch_errors_total.load(Ordering::Relaxed)
    }

    /// Get the total number of misses served by another caller's fetch.
    pub fn coalesced_total(&self) -> u64 {
        self.coalesced_total.load(Ordering::Relaxed)
    }

    /// Get the total number of invalidated entries.
    pub fn invalidations_total(&self) -> u64 {
        self.invalidations_total.load(Ordering::Relaxed)
    }

    /// Get the cache hit rate (0.0 to 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits_total() as f64;
        let total = (self.cache_hits_total() + self.cache_misses_total()) as f64;

        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Print a summary of all metrics.
    pub fn summary(&self) -> String {
        format!(
            "Cache Metrics Summary:\n\
             Cache Hits: {}\n\
             Cache Misses: {}\n\
             Cache Hit Rate: {:.2}%\n\
             Backend Fetches: {} ({} failed)\n\
             Coalesced Requests: {}\n\
             Invalidated Entries: {}",
            self.cache_hits_total(),
            self.cache_misses_total(),
            self.cache_hit_rate() * 100.0,
            self.fetches_total(),
            self.fetch_errors_total(),
            self.coalesced_total(),
            self.invalidations_total(),
        )
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A timer for tracking operation duration.
pub struct Timer {
    start: Instant,
    operation: String,
}

impl Timer {
    /// Start a new timer for the given operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.into(),
        }
    }

    /// Finish the timer and return the elapsed time in milliseconds.
    pub fn finish(self) -> u128 {
        let duration_ms = self.start.elapsed().as_millis();

        tracing::debug!(
            operation = %self.operation,
            duration_ms = duration_ms,
            "Operation completed"
        );

        duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.cache_hits_total(), 0);
        assert_eq!(metrics.cache_misses_total(), 0);
        assert_eq!(metrics.fetches_total(), 0);
        assert_eq!(metrics.coalesced_total(), 0);
    }

    #[test]
    fn test_track_cache_access() {
        let metrics = CacheMetrics::new();

        metrics.track_cache_access("quote", "quote:a", true);
        assert_eq!(metrics.cache_hits_total(), 1);
        assert_eq!(metrics.cache_misses_total(), 0);

        metrics.track_cache_access("quote", "quote:a", false);
        assert_eq!(metrics.cache_hits_total(), 1);
        assert_eq!(metrics.cache_misses_total(), 1);
    }

    #[test]
    fn test_track_fetch() {
        let metrics = CacheMetrics::new();

        metrics.track_fetch("quote", 40, true);
        metrics.track_fetch("quote", 90, false);
        assert_eq!(metrics.fetches_total(), 2);
        assert_eq!(metrics.fetch_errors_total(), 1);
    }

    #[test]
    fn test_cache_hit_rate() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.cache_hit_rate(), 0.0);

        metrics.track_cache_access("test", "k", true);
        metrics.track_cache_access("test", "k", true);
        metrics.track_cache_access("test", "k", false);

        assert!((metrics.cache_hit_rate() - 0.6667).abs() < 0.001);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::new();
        let other = metrics.clone();

        other.track_coalesced("price");
        other.track_invalidation("quote", 3);

        assert_eq!(metrics.coalesced_total(), 1);
        assert_eq!(metrics.invalidations_total(), 3);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::new("test_operation");
        std::thread::sleep(std::time::Duration::from_millis(10));
        let duration = timer.finish();
        assert!(duration >= 10);
    }

    #[test]
    fn test_summary() {
        let metrics = CacheMetrics::new();
        metrics.track_fetch("quote", 100, true);
        metrics.track_cache_access("quote", "k", true);

        let summary = metrics.summary();
        assert!(summary.contains("Cache Hits: 1"));
        assert!(summary.contains("Backend Fetches: 1 (0 failed)"));
    }
}
