//! Cache Module
//!
//! Best-effort metadata cache over the shared store, with bounded
//! per-namespace eviction.

mod keys;
mod layer;
mod stats;


// Re-export public types
pub use keys::CacheKeys;
pub use layer::{Lookup, MetaCache};
pub use stats::{CacheStats, CacheStatsSnapshot};
