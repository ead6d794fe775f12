//! Domain value objects and types.
//!
//! Type-safe wrappers for token addresses and amounts. Validation happens at
//! construction, so everything downstream (cache keys in particular) can rely
//! on a single canonical spelling.

pub mod amount;
pub mod errors;
pub mod token_address;

pub use amount::Amount;
pub use errors::ValidationError;
pub use token_address::TokenAddress;
