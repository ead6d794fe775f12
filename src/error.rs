//! Error types for the swap cache.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors reported by backend producers (RPC quoters, price subgraph, token contracts).
///
/// Producer failures are not cache errors. They are handed unchanged to every
/// caller waiting on the same flight, which is why the type is `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// RPC call failed
    #[error("RPC call failed: {0}")]
    Rpc(String),

    /// Subgraph query failed
    #[error("Subgraph query failed: {0}")]
    Subgraph(String),

    /// No route or record exists for the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend did not answer in time
    #[error("Request timeout")]
    Timeout,

    /// Backend rejected the call because of rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Request was rejected before reaching the backend
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The task running the fetch panicked or was cancelled
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),

    /// Generic backend error with context
    #[error("Fetch error: {0}")]
    Other(String),
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(err: tokio::task::JoinError) -> Self {
        FetchError::TaskFailed(err.to_string())
    }
}

/// Errors from the durable medium behind the persistent store.
///
/// These never leave the public store API; they are collapsed into a miss
/// (reads) or a no-op (writes).
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying I/O failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock guarding the medium was poisoned
    #[error("Storage lock poisoned: {0}")]
    Poisoned(String),

    /// Medium is not available (quota, permissions, disabled storage)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Convenience type alias for Results with FetchError
pub type FetchResult<T> = Result<T, FetchError>;

/// Convenience type alias for Results with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::NotFound("route".to_string());
        assert_eq!(err.to_string(), "Not found: route");

        let err = ConfigError::MissingVar("CACHE_FILE".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: CACHE_FILE"
        );

        let err = StorageError::Unavailable("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Storage unavailable: quota exceeded");
    }

    #[test]
    fn test_fetch_error_is_cloneable() {
        let err = FetchError::Rpc("execution reverted".to_string());
        let copy = err.clone();
        assert_eq!(err, copy);
    }

    #[tokio::test]
    async fn test_fetch_error_from_panicked_task() {
        let handle = tokio::spawn(async { panic!("quoter crashed") });
        let err: FetchError = handle.await.unwrap_err().into();
        assert!(matches!(err, FetchError::TaskFailed(_)));
        assert!(err.to_string().starts_with("Fetch task failed"));
    }

    #[test]
    fn test_storage_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io.into();
        assert!(err.to_string().contains("denied"));
    }
}
