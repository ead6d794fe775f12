//! Data models for the values the cache layer stores.
//!
//! Quote requests and results from the on-chain quoter, subgraph prices, and
//! ERC-20 token metadata.

pub mod quote;
pub mod token;

pub use quote::{Quote, QuoteRequest, QuoteResponse};
pub use token::{TokenMetadata, TokenPrice};
