//! Token metadata and price models.

use crate::cache::keys::{CacheKey, KeyBuilder};
use crate::domain::TokenAddress;
use serde::{Deserialize, Serialize};

/// Operation tag for subgraph price keys.
pub const PRICE_TAG: &str = "price";

/// Static ERC-20 metadata. Changes essentially never, so it is persisted.
///
/// Persisted as a `TokenMetadataRecord`: these fields plus `storedAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Ticker symbol
    pub symbol: String,

    /// Human-readable name
    pub name: String,

    /// Number of decimals used by the token
    pub decimals: u8,
}

/// USD price of a token as reported by the price subgraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrice {
    /// Token the price applies to
    pub token: TokenAddress,

    /// Price in USD
    pub usd: f64,
}

impl TokenPrice {
    /// Cache key for the price of `token`.
    pub fn cache_key(token: &TokenAddress) -> CacheKey {
        KeyBuilder::new(PRICE_TAG).address(token).build()
    }

    /// Prefix shared by every price key.
    pub fn key_prefix() -> String {
        KeyBuilder::new(PRICE_TAG).prefix()
    }
}
