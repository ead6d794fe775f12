use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use swap_cache::domain::Amount;
use swap_cache::error::{FetchError, FetchResult};
use swap_cache::models::{Quote, QuoteRequest};
use swap_cache::sources::QuoteSource;
use tokio::sync::Semaphore;

/// Mock quoter for testing.
///
/// Answers every request with a deterministic quote, can be switched to fail,
/// and can be held so concurrent callers pile up on one in-flight call.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockQuoteSource {
    failure: Arc<Mutex<Option<FetchError>>>,
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
    total_calls: Arc<Mutex<usize>>,
}

#[allow(dead_code)]
impl MockQuoteSource {
    /// Create a mock that answers immediately.
    pub fn new() -> Self {
        Self {
            failure: Arc::new(Mutex::new(None)),
            gate: Arc::new(Mutex::new(None)),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
            total_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Make every following call fail with `error`.
    pub fn fail_with(&self, error: FetchError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Make following calls succeed again.
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Block calls until [`release`](Self::release) is called.
    pub fn hold(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let held calls (and all later ones) through.
    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().unwrap().take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Number of calls made for a specific cache key.
    pub fn get_call_count(&self, key: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(key).unwrap_or(&0)
    }

    /// Number of calls made in total.
    pub fn total_calls(&self) -> usize {
        *self.total_calls.lock().unwrap()
    }

    fn track_call(&self, key: &str) -> usize {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(key.to_string()).or_insert(0) += 1;

        let mut total = self.total_calls.lock().unwrap();
        *total += 1;
        *total
    }
}

impl Default for MockQuoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    async fn fetch_quote(&self, request: &QuoteRequest) -> FetchResult<Quote> {
        let call = self.track_call(request.cache_key().as_str());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| FetchError::Other(e.to_string()))?;
        }

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(Quote {
            amount_in: request.amount.clone(),
            amount_out: Amount::new("1999").unwrap(),
            fee_tier: request.fee_tier,
            gas_estimate: 150_000,
            block_number: call as u64,
        })
    }
}
