//! Swap quote request and result models.

use crate::cache::keys::{CacheKey, KeyBuilder};
use crate::domain::{Amount, TokenAddress};
use serde::{Deserialize, Serialize};

/// Operation tag for quote keys.
pub const QUOTE_TAG: &str = "quote";

/// A request for a swap quote.
///
/// `fee_tier` and `tick_spacing` are optional pool hints. When absent they are
/// left out of the cache key entirely rather than encoded as empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Token being sold
    pub token_in: TokenAddress,

    /// Token being bought
    pub token_out: TokenAddress,

    /// Amount in base units (input amount when `exact_input`, otherwise output)
    pub amount: Amount,

    /// Exact-input (true) or exact-output (false) quote
    pub exact_input: bool,

    /// Pool fee tier in hundredths of a bip (e.g. 3000 for 0.3%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_tier: Option<u32>,

    /// Concentrated-liquidity tick spacing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_spacing: Option<i32>,
}

impl QuoteRequest {
    /// Create an exact-input quote request with no pool hints.
    pub fn exact_in(token_in: TokenAddress, token_out: TokenAddress, amount: Amount) -> Self {
        Self {
            token_in,
            token_out,
            amount,
            exact_input: true,
            fee_tier: None,
            tick_spacing: None,
        }
    }

    /// Set the fee tier hint.
    pub fn with_fee_tier(mut self, fee_tier: u32) -> Self {
        self.fee_tier = Some(fee_tier);
        self
    }

    /// Set the tick spacing hint.
    pub fn with_tick_spacing(mut self, tick_spacing: i32) -> Self {
        self.tick_spacing = Some(tick_spacing);
        self
    }

    /// Canonical cache key for this request.
    ///
    /// Format: `quote:<in>:<out>:<amount>:<exact_input>[:fee:<tier>][:tick:<spacing>]`
    pub fn cache_key(&self) -> CacheKey {
        self.pair_key_builder()
            .amount(&self.amount)
            .flag(self.exact_input)
            .optional("fee", self.fee_tier)
            .optional("tick", self.tick_spacing)
            .build()
    }

    /// Prefix shared by every quote for this token pair and direction.
    pub fn pair_prefix(token_in: &TokenAddress, token_out: &TokenAddress) -> String {
        KeyBuilder::new(QUOTE_TAG)
            .address(token_in)
            .address(token_out)
            .prefix()
    }

    fn pair_key_builder(&self) -> KeyBuilder {
        KeyBuilder::new(QUOTE_TAG)
            .address(&self.token_in)
            .address(&self.token_out)
    }
}

/// A computed swap quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Amount sold, in base units
    pub amount_in: Amount,

    /// Amount bought, in base units
    pub amount_out: Amount,

    /// Fee tier of the pool the quote was routed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_tier: Option<u32>,

    /// Estimated gas units for the swap
    pub gas_estimate: u64,

    /// Block number the quote was computed at
    pub block_number: u64,
}

/// Response from a quote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteResponse {
    /// The quote
    pub quote: Quote,

    /// Whether the quote came from cache
    pub from_cache: bool,
}
