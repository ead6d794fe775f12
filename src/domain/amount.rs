//! Amount value object.

use super::errors::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("Failed to compile amount regex"));

/// A token amount in base units (wei-style integer), kept as an exact
/// decimal string.
///
/// On-chain amounts routinely exceed `u128`, and float formatting would make
/// equal amounts produce different cache keys, so the canonical form is the
/// digit string itself with leading zeros stripped.
///
/// # Example
///
/// ```
/// use swap_cache::domain::Amount;
///
/// let amount = Amount::new("0001000000").unwrap();
/// assert_eq!(amount.as_str(), "1000000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount(String);

impl Amount {
    /// Create a new Amount from a decimal digit string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidAmount` for anything other than ASCII
    /// digits (signs, decimal points, exponents and whitespace are rejected).
    pub fn new(amount: impl Into<String>) -> Result<Self, ValidationError> {
        let amount = amount.into();

        if !DIGITS_RE.is_match(&amount) {
            return Err(ValidationError::InvalidAmount(amount));
        }

        let stripped = amount.trim_start_matches('0');
        if stripped.is_empty() {
            return Ok(Self("0".to_string()));
        }

        Ok(Self(stripped.to_string()))
    }

    /// Get the canonical decimal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
