//! Cache Module
//!
//! Provides a generic in-memory cache with TTL expiration, lazy eviction on
//! read and an explicit sweep.

mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TtlCache;

// == Public Constants ==
/// Default TTL applied by [`TtlCache::new`] when none is configured
pub const DEFAULT_TTL_SECS: u64 = 300;
