//! Domain validation errors.

use std::fmt;

/// Errors that can occur during domain value object validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided token address is not a 20-byte hex address.
    InvalidAddress(String),

    /// The provided amount is not a non-negative integer in base units.
    InvalidAmount(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddress(address) => write!(f, "Invalid token address: {}", address),
            Self::InvalidAmount(amount) => write!(f, "Invalid amount: {}", amount),
        }
    }
}

impl std::error::Error for ValidationError {}
