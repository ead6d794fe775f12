//! Swap Cache - the client-side cache and request-coalescing layer of a DEX front end.
//!
//! Sits between UI callers (quote computation, price and token metadata
//! lookups) and the expensive, rate-limited backends behind them (on-chain
//! RPC and the price subgraph).
//!
//! # Architecture
//!
//! - **cache**: Key derivation, volatile and persistent stores, request coalescing
//! - **services**: Quote, price and token metadata lookups built on the cache
//! - **sources**: Producer traits implemented by the backend clients
//! - **models**: Quote, price and token metadata types
//! - **domain**: Validated token addresses and amounts
//! - **config**: TTL policy and store settings from environment variables
//! - **error**: Error types
//! - **observability**: Cache metrics and tracing setup

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
pub mod sources;

pub use cache::{
    CacheContext, CacheEntry, CacheKey, Coalescer, KeyBuilder, PersistentStore, VolatileStore,
};
pub use config::{Config, TtlPolicy};
pub use error::{ConfigError, FetchError, StorageError};
pub use models::{Quote, QuoteRequest, QuoteResponse, TokenMetadata, TokenPrice};
pub use observability::CacheMetrics;
pub use services::{
    QuoteService, QuoteServiceImpl, TokenMetadataService, TokenMetadataServiceImpl,
    TokenPriceService, TokenPriceServiceImpl,
};
