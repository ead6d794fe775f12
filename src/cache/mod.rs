//! Caching and request-coalescing primitives.
//!
//! - [`KeyBuilder`] derives canonical keys from request parameters
//! - [`VolatileStore`] holds short-lived results in memory, TTL checked per lookup
//! - [`PersistentStore`] keeps low-churn records on a [`DurableMedium`], fail-soft
//! - [`Coalescer`] merges concurrent identical fetches into one
//! - [`CacheContext`] owns all of the above for one session

pub mod clock;
pub mod coalescer;
pub mod context;
pub mod entry;
pub mod keys;
pub mod medium;
pub mod persistent;
pub mod volatile;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coalescer::Coalescer;
pub use context::CacheContext;
pub use entry::CacheEntry;
pub use keys::{CacheKey, KeyBuilder};
pub use medium::{DurableMedium, FileMedium, MemoryMedium};
pub use persistent::{PersistentStore, StoreLookup};
pub use volatile::VolatileStore;
