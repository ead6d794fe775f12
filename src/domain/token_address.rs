//! TokenAddress value object.

use super::errors::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[xX][0-9a-fA-F]{40}$").expect("address regex is valid"));

/// A type-safe wrapper for ERC-20 token addresses.
///
/// Addresses are validated at construction time and stored lower-case, so two
/// spellings of the same address (checksummed or not) compare equal and
/// produce the same cache key.
///
/// # Example
///
/// ```
/// use swap_cache::domain::TokenAddress;
///
/// let a = TokenAddress::new("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
/// let b = TokenAddress::new("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Create a new TokenAddress, validating and lower-casing it.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidAddress` if the input is not `0x`
    /// followed by 40 hex digits.
    pub fn new(address: impl Into<String>) -> Result<Self, ValidationError> {
        let address = address.into();
        let trimmed = address.trim();

        if !ADDRESS_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidAddress(address));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// Get the normalized address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for TokenAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TokenAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TokenAddress::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
