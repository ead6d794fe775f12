//! Application service layer.
//!
//! Services are the callers of the cache: they look a value up in the right
//! store, fall back to a coalesced backend fetch on a miss, and write the
//! result back once per fetch.

mod price_service;
mod quote_service;
mod token_metadata_service;

pub use price_service::{TokenPriceService, TokenPriceServiceImpl};
pub use quote_service::{QuoteService, QuoteServiceImpl};
pub use token_metadata_service::{TokenMetadataService, TokenMetadataServiceImpl};
