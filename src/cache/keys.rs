//! Canonical cache key derivation.
//!
//! Keys are colon-delimited, built in a fixed field order:
//!
//! ```text
//! <operation-tag>:<param1>:<param2>:...[:<optional-tag>:<value>]
//! ```
//!
//! Address fields are lower-cased, amounts are exact decimal strings, and
//! absent optional parameters are omitted entirely. The format is shared with
//! records already persisted by earlier sessions, so it must not drift.

use crate::domain::{Amount, TokenAddress};
use std::fmt;

/// Field delimiter. Never valid inside a field.
pub const DELIMITER: char = ':';

/// A canonical cache key produced by [`KeyBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builder for [`CacheKey`]s.
///
/// # Example
///
/// ```
/// use swap_cache::cache::KeyBuilder;
/// use swap_cache::domain::{Amount, TokenAddress};
///
/// let token = TokenAddress::new("0x6B175474E89094C44Da98b954EedeAC495271d0F").unwrap();
/// let key = KeyBuilder::new("quote")
///     .address(&token)
///     .amount(&Amount::new("1000").unwrap())
///     .optional("tick", Some(60))
///     .optional("fee", None::<u32>)
///     .build();
///
/// assert_eq!(
///     key.as_str(),
///     "quote:0x6b175474e89094c44da98b954eedeac495271d0f:1000:tick:60"
/// );
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct KeyBuilder {
    fields: Vec<String>,
}

impl KeyBuilder {
    /// Start a key for the given operation tag.
    pub fn new(tag: &str) -> Self {
        Self {
            fields: vec![tag.to_lowercase()],
        }
    }

    /// Append a token address (already normalized by [`TokenAddress`]).
    pub fn address(self, address: &TokenAddress) -> Self {
        self.push(address.as_str().to_string())
    }

    /// Append a raw address-like identifier, lower-cased.
    pub fn identifier(self, id: &str) -> Self {
        self.push(id.trim().to_lowercase())
    }

    /// Append an amount in its exact decimal form.
    pub fn amount(self, amount: &Amount) -> Self {
        self.push(amount.as_str().to_string())
    }

    /// Append a boolean flag as `true` / `false`.
    pub fn flag(self, value: bool) -> Self {
        self.push(value.to_string())
    }

    /// Append an integer parameter (tick spacing, fee tier, chain id).
    pub fn number(self, value: impl Into<i64>) -> Self {
        self.push(value.into().to_string())
    }

    /// Append a free-form text field verbatim.
    pub fn text(self, value: &str) -> Self {
        self.push(value.to_string())
    }

    /// Append `<tag>:<value>` when `value` is present, nothing otherwise.
    pub fn optional<V: fmt::Display>(self, tag: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(tag.to_lowercase()).push(v.to_string()),
            None => self,
        }
    }

    /// Finish the key.
    ///
    /// # Panics
    ///
    /// Panics if any field is empty or contains the delimiter. Typed inputs
    /// make this unreachable; hitting it is a programming error.
    pub fn build(self) -> CacheKey {
        CacheKey(self.join())
    }

    /// Finish as a prefix (with trailing delimiter) for prefix invalidation.
    ///
    /// The trailing delimiter keeps `quote:0xab` from matching `quote:0xabc...`.
    pub fn prefix(self) -> String {
        let mut joined = self.join();
        joined.push(DELIMITER);
        joined
    }

    fn push(mut self, field: String) -> Self {
        self.fields.push(field);
        self
    }

    fn join(self) -> String {
        for field in &self.fields {
            assert!(
                !field.is_empty() && !field.contains(DELIMITER),
                "malformed cache key field {:?}",
                field
            );
        }
        self.fields.join(&DELIMITER.to_string())
    }
}
