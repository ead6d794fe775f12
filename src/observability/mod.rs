//! Observability module for monitoring and metrics.
//!
//! Cache metrics plus the stderr tracing subscriber used by the binary.

pub mod logging;
pub mod metrics;

pub use logging::init_tracing;
pub use metrics::{CacheMetrics, Timer};
