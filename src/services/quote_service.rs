//! Quote service layer.
//!
//! Serves swap quotes from the fast-quote class of the volatile store,
//! coalescing concurrent misses into one quoter call.

use crate::cache::CacheContext;
use crate::domain::TokenAddress;
use crate::error::{FetchError, FetchResult};
use crate::models::{QuoteRequest, QuoteResponse};
use crate::observability::Timer;
use crate::sources::QuoteSource;
use async_trait::async_trait;
use std::sync::Arc;

const CLASS: &str = "quote";

/// Quote service trait for business operations.
#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Get a quote, from cache when a fresh one exists.
    async fn get_quote(&self, request: &QuoteRequest) -> FetchResult<QuoteResponse>;

    /// Drop cached quotes for one pair and direction. Returns how many were dropped.
    fn invalidate_pair(&self, token_in: &TokenAddress, token_out: &TokenAddress) -> usize;
}

/// Default implementation of QuoteService.
pub struct QuoteServiceImpl {
    ctx: CacheContext,
    source: Arc<dyn QuoteSource>,
}

/// Validation helper functions.
impl QuoteServiceImpl {
    fn validate_request(request: &QuoteRequest) -> Result<(), String> {
        if request.token_in == request.token_out {
            return Err("Cannot quote a token against itself".to_string());
        }
        if request.amount.is_zero() {
            return Err("Quote amount must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl QuoteServiceImpl {
    /// Create a new quote service over `ctx`.
    pub fn new(ctx: &CacheContext, source: Arc<dyn QuoteSource>) -> Self {
        Self {
            ctx: ctx.clone(),
            source,
        }
    }
}

#[async_trait]
impl QuoteService for QuoteServiceImpl {
    async fn get_quote(&self, request: &QuoteRequest) -> FetchResult<QuoteResponse> {
        Self::validate_request(request).map_err(FetchError::InvalidRequest)?;

        let key = request.cache_key().into_inner();
        let metrics = &self.ctx.metrics;

        if let Some(entry) = self.ctx.quotes.get(&key, self.ctx.ttl.quote) {
            metrics.track_cache_access(CLASS, &key, true);
            return Ok(QuoteResponse {
                quote: entry.value,
                from_cache: true,
            });
        }
        metrics.track_cache_access(CLASS, &key, false);

        let source = self.source.clone();
        let ctx = self.ctx.clone();
        let flight_metrics = metrics.clone();
        let request = request.clone();
        let store_key = key.clone();

        let (result, joined) = self
            .ctx
            .quote_flights
            .run_tracked(&key, move || {
                let epoch = ctx.chain_epoch();
                async move {
                    let timer = Timer::new("fetch_quote");
                    let result = source.fetch_quote(&request).await;
                    flight_metrics.track_fetch(CLASS, timer.finish(), result.is_ok());

                    match &result {
                        Ok(quote) if ctx.chain_epoch() == epoch => {
                            ctx.quotes.set(store_key, quote.clone());
                        }
                        Ok(_) => {
                            tracing::debug!(key = %store_key, "Chain state changed mid-fetch, not caching");
                        }
                        Err(_) => {}
                    }
                    result
                }
            })
            .await;

        if joined {
            metrics.track_coalesced(CLASS);
        }

        Ok(QuoteResponse {
            quote: result?,
            from_cache: false,
        })
    }

    fn invalidate_pair(&self, token_in: &TokenAddress, token_out: &TokenAddress) -> usize {
        let prefix = QuoteRequest::pair_prefix(token_in, token_out);
        let removed = self.ctx.quotes.invalidate_by_prefix(&prefix);
        self.ctx.metrics.track_invalidation(CLASS, removed);
        removed
    }
}
