//! Token metadata service layer.
//!
//! Symbol, name and decimals change essentially never, so they live in the
//! persistent store and survive restarts. A broken medium only costs a refetch.
//! Medium access may block on file I/O, so it runs on tokio's blocking pool.

use crate::cache::CacheContext;
use crate::domain::TokenAddress;
use crate::error::FetchResult;
use crate::models::TokenMetadata;
use crate::observability::Timer;
use crate::sources::TokenMetadataSource;
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

const CLASS: &str = "token_metadata";

/// Token metadata service trait for business operations.
#[async_trait]
pub trait TokenMetadataService: Send + Sync {
    /// Get metadata for `token`, from the persisted cache when fresh.
    async fn get_metadata(&self, token: &TokenAddress) -> FetchResult<TokenMetadata>;

    /// Get metadata for a token list concurrently. Results keep input order.
    async fn get_many(&self, tokens: &[TokenAddress]) -> Vec<FetchResult<TokenMetadata>>;

    /// Forget the persisted record for `token`. Returns whether one existed.
    async fn evict(&self, token: &TokenAddress) -> bool;
}

/// Default implementation of TokenMetadataService.
pub struct TokenMetadataServiceImpl {
    ctx: CacheContext,
    source: Arc<dyn TokenMetadataSource>,
}

impl TokenMetadataServiceImpl {
    /// Create a new token metadata service over `ctx`.
    pub fn new(ctx: &CacheContext, source: Arc<dyn TokenMetadataSource>) -> Self {
        Self {
            ctx: ctx.clone(),
            source,
        }
    }
}

#[async_trait]
impl TokenMetadataService for TokenMetadataServiceImpl {
    async fn get_metadata(&self, token: &TokenAddress) -> FetchResult<TokenMetadata> {
        let id = token.as_str();
        let metrics = &self.ctx.metrics;

        let store = self.ctx.token_metadata.clone();
        let lookup_id = id.to_string();
        let cached = tokio::task::spawn_blocking(move || store.get(&lookup_id))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Persistent cache read task failed");
                None
            });

        if let Some(entry) = cached {
            metrics.track_cache_access(CLASS, id, true);
            return Ok(entry.value);
        }
        metrics.track_cache_access(CLASS, id, false);

        let source = self.source.clone();
        let store = self.ctx.token_metadata.clone();
        let flight_metrics = metrics.clone();
        let token = token.clone();

        let (result, joined) = self
            .ctx
            .metadata_flights
            .run_tracked(id, move || async move {
                let timer = Timer::new("fetch_token_metadata");
                let result = source.fetch_metadata(&token).await;
                flight_metrics.track_fetch(CLASS, timer.finish(), result.is_ok());

                if let Ok(metadata) = &result {
                    let metadata = metadata.clone();
                    let write = tokio::task::spawn_blocking(move || {
                        store.set(token.as_str(), &metadata);
                    });
                    if let Err(e) = write.await {
                        tracing::warn!(error = %e, "Persistent cache write task failed");
                    }
                }
                result
            })
            .await;

        if joined {
            metrics.track_coalesced(CLASS);
        }

        result
    }

    async fn get_many(&self, tokens: &[TokenAddress]) -> Vec<FetchResult<TokenMetadata>> {
        join_all(tokens.iter().map(|token| self.get_metadata(token))).await
    }

    async fn evict(&self, token: &TokenAddress) -> bool {
        let store = self.ctx.token_metadata.clone();
        let id = token.as_str().to_string();

        let removed = tokio::task::spawn_blocking(move || store.invalidate(&id))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Persistent cache eviction task failed");
                false
            });

        self.ctx.metrics.track_invalidation(CLASS, usize::from(removed));
        removed
    }
}
