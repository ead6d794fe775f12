//! Token price service layer.
//!
//! Subgraph USD prices, cached in the price class of the volatile store.

use crate::cache::CacheContext;
use crate::domain::TokenAddress;
use crate::error::FetchResult;
use crate::models::TokenPrice;
use crate::observability::Timer;
use crate::sources::PriceSource;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

const CLASS: &str = "price";

/// Price service trait for business operations.
#[async_trait]
pub trait TokenPriceService: Send + Sync {
    /// Get the USD price of `token`, from cache when fresh.
    async fn get_price(&self, token: &TokenAddress) -> FetchResult<TokenPrice>;

    /// Get prices for several tokens concurrently. Results keep input order.
    async fn get_prices(&self, tokens: &[TokenAddress]) -> Vec<FetchResult<TokenPrice>>;
}

/// Default implementation of TokenPriceService.
pub struct TokenPriceServiceImpl {
    ctx: CacheContext,
    source: Arc<dyn PriceSource>,
}

impl TokenPriceServiceImpl {
    /// Create a new price service over `ctx`.
    pub fn new(ctx: &CacheContext, source: Arc<dyn PriceSource>) -> Self {
        Self {
            ctx: ctx.clone(),
            source,
        }
    }
}

#[async_trait]
impl TokenPriceService for TokenPriceServiceImpl {
    async fn get_price(&self, token: &TokenAddress) -> FetchResult<TokenPrice> {
        let key = TokenPrice::cache_key(token).into_inner();
        let metrics = &self.ctx.metrics;

        if let Some(entry) = self.ctx.prices.get(&key, self.ctx.ttl.price) {
            metrics.track_cache_access(CLASS, &key, true);
            return Ok(entry.value);
        }
        metrics.track_cache_access(CLASS, &key, false);

        let source = self.source.clone();
        let ctx = self.ctx.clone();
        let flight_metrics = metrics.clone();
        let token = token.clone();
        let store_key = key.clone();

        let (result, joined) = self
            .ctx
            .price_flights
            .run_tracked(&key, move || {
                let epoch = ctx.chain_epoch();
                async move {
                    let timer = Timer::new("fetch_price");
                    let result = source.fetch_price(&token).await;
                    flight_metrics.track_fetch(CLASS, timer.finish(), result.is_ok());

                    match &result {
                        Ok(price) if ctx.chain_epoch() == epoch => {
                            ctx.prices.set(store_key, price.clone());
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

        result
    }

    async fn get_prices(&self, tokens: &[TokenAddress]) -> Vec<FetchResult<TokenPrice>> {
        join_all(tokens.iter().map(|token| self.get_price(token))).await
    }
}
