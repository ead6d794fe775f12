//! Producer interfaces for the expensive backends behind the cache.
//!
//! The RPC and subgraph clients live outside this crate; they plug in by
//! implementing these traits.

mod traits;

pub use traits::{PriceSource, QuoteSource, TokenMetadataSource};
