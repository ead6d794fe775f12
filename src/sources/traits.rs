use crate::domain::TokenAddress;
use crate::error::FetchResult;
use crate::models::{Quote, QuoteRequest, TokenMetadata, TokenPrice};
use async_trait::async_trait;

/// Backend that computes swap quotes (on-chain quoter contract over RPC).
///
/// Implementations own their own timeouts; the cache layer never aborts a call.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Compute a quote for `request`.
    async fn fetch_quote(&self, request: &QuoteRequest) -> FetchResult<Quote>;
}

/// Backend that reports token USD prices (price subgraph).
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current USD price of `token`.
    async fn fetch_price(&self, token: &TokenAddress) -> FetchResult<TokenPrice>;
}

/// Backend that reads ERC-20 metadata (symbol/name/decimals calls).
#[async_trait]
pub trait TokenMetadataSource: Send + Sync {
    /// Read the metadata of `token`.
    async fn fetch_metadata(&self, token: &TokenAddress) -> FetchResult<TokenMetadata>;
}
