//! Request coalescing.
//!
//! Concurrent requests for the same key share one in-flight producer call.
//! Every waiter gets a clone of the same outcome, success or failure. The
//! registration is dropped the moment that call settles, so the next request
//! after settlement starts fresh: failures are never memoized.
//!
//! Each producer runs on its own tokio task. Waiters only observe it:
//! dropping every waiter neither pauses nor cancels the work, and the
//! registration is removed when the task ends, even if the producer panics.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinError;

type Flight<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;
type Registry<T, E> = Mutex<HashMap<String, Registration<T, E>>>;

struct Registration<T, E> {
    id: u64,
    flight: Flight<T, E>,
}

/// Deduplicates concurrent producer calls per key.
///
/// Cheap to clone; clones share the same in-flight registry. Must be used
/// from within a tokio runtime.
pub struct Coalescer<T, E> {
    in_flight: Arc<Registry<T, E>>,
    next_id: Arc<AtomicU64>,
}

impl<T, E> Clone for Coalescer<T, E> {
    fn clone(&self) -> Self {
        Self {
            in_flight: self.in_flight.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<T, E> Default for Coalescer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Coalescer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    /// Create an empty coalescer.
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `producer` for `key`, or join the flight already running for it.
    ///
    /// `producer` is only invoked when no flight for `key` is outstanding.
    /// Registration happens when `run` is called, not when the returned
    /// future is first polled. A producer panic reaches the waiters as
    /// `E::from(JoinError)`.
    pub fn run<F, Fut>(&self, key: &str, producer: F) -> impl Future<Output = Result<T, E>> + Send
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (flight, _) = self.join_or_start(key, producer);
        flight
    }

    /// Like [`run`](Self::run), also reporting whether this call joined an
    /// existing flight (`true`) or started a new one (`false`).
    pub fn run_tracked<F, Fut>(
        &self,
        key: &str,
        producer: F,
    ) -> impl Future<Output = (Result<T, E>, bool)> + Send
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (flight, joined) = self.join_or_start(key, producer);
        flight.map(move |result| (result, joined))
    }

    /// Number of keys with an outstanding flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// Whether a flight for `key` is outstanding.
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }

    /// Detach every outstanding flight. Returns how many were detached.
    ///
    /// Detached flights still run to completion and still reach the callers
    /// already waiting on them, but later calls start fresh.
    pub fn forget_all(&self) -> usize {
        let mut map = lock(&self.in_flight);
        let detached = map.len();
        map.clear();
        detached
    }

    fn join_or_start<F, Fut>(&self, key: &str, producer: F) -> (Flight<T, E>, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        // Held across the spawn: the task cannot deregister before it is registered
        let mut map = lock(&self.in_flight);

        if let Some(existing) = map.get(key) {
            tracing::trace!(key = %key, "Joining in-flight request");
            return (existing.flight.clone(), true);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = self.in_flight.clone();
        let owned_key = key.to_string();
        let work = producer();

        let task = tokio::spawn(async move {
            // Created on first poll: a task dropped unpolled never takes the lock
            let _settle = SettleGuard {
                registry,
                key: owned_key,
                id,
            };
            work.await
        });

        let flight = async move { task.await.unwrap_or_else(|e| Err(E::from(e))) }
            .boxed()
            .shared();

        map.insert(
            key.to_string(),
            Registration {
                id,
                flight: flight.clone(),
            },
        );
        tracing::debug!(key = %key, flight = id, "Started request");

        (flight, false)
    }
}

fn lock<T, E>(registry: &Registry<T, E>) -> MutexGuard<'_, HashMap<String, Registration<T, E>>> {
    match registry.lock() {
        Ok(map) => map,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Removes a flight's registration when its task ends, however it ends.
struct SettleGuard<T, E> {
    registry: Arc<Registry<T, E>>,
    key: String,
    id: u64,
}

impl<T, E> Drop for SettleGuard<T, E> {
    fn drop(&mut self) {
        let mut map = lock(&self.registry);

        // A newer flight may own the key after forget_all
        if map.get(&self.key).map(|reg| reg.id == self.id).unwrap_or(false) {
            map.remove(&self.key);
            tracing::debug!(key = %self.key, flight = self.id, "Request settled");
        }
    }
}

impl<T, E> std::fmt::Debug for Coalescer<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let in_flight = self.in_flight.lock().map(|map| map.len()).unwrap_or(0);
        f.debug_struct("Coalescer")
            .field("in_flight", &in_flight)
            .finish()
    }
}
