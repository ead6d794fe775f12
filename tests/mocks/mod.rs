//! Mock backends for integration testing.

pub mod mock_quote_source;
pub mod mock_token_source;

#[allow(unused_imports)]
pub use mock_quote_source::MockQuoteSource;
#[allow(unused_imports)]
pub use mock_token_source::MockTokenSource;
