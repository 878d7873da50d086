//! Store Module
//!
//! Abstraction over the remote expiring key-value store shared by the
//! cache and scheduler subsystems.
//!
//! The trait covers exactly the primitives the core needs: expiring
//! string values, sorted sets scored by unix-millis timestamps, plain
//! sets, and hashes. Any store offering these suffices; `RedisStore` is
//! the production implementation and `MemoryStore` backs tests and
//! store-less deployments.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Store Error ==
/// Error raised by store operations.
///
/// Callers in the cache and scheduler layers treat any variant as
/// "store unavailable" and degrade; nothing here reaches a request.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or the command failed
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Shared handle to a store implementation.
pub type SharedStore = Arc<dyn StoreClient>;

// == Store Client Trait ==
/// Asynchronous client for an expiring key-value store.
///
/// All methods are independent network round trips; there are no
/// transactions across calls. Multi-step sequences built on top of this
/// trait tolerate interleaving and partial completion.
#[async_trait]
pub trait StoreClient: Send + Sync {
    // -- plain keys --
    /// Fetches the string value stored at `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` at `key` with an expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Deletes `key` (any type). Missing keys are not an error.
    async fn del(&self, key: &str) -> StoreResult<()>;

    /// Sets or refreshes the expiry of an existing key.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;

    // -- sorted sets (scored by unix-millis) --
    /// Adds `member` with `score`, replacing any previous score.
    async fn zadd(&self, key: &str, member: &str, score: i64) -> StoreResult<()>;

    /// Members with `min <= score <= max`, ascending by score, at most
    /// `count` of them (`count < 0` means unbounded).
    async fn zrange_by_score_limit(
        &self,
        key: &str,
        min: f64,
        max: f64,
        count: isize,
    ) -> StoreResult<Vec<String>>;

    /// Full snapshot of the sorted set, ascending by score.
    async fn zrange_with_scores(&self, key: &str) -> StoreResult<Vec<(String, i64)>>;

    /// Removes `member` from the sorted set.
    async fn zrem(&self, key: &str, member: &str) -> StoreResult<()>;

    /// Number of members in the sorted set.
    async fn zcard(&self, key: &str) -> StoreResult<usize>;

    // -- plain sets --
    /// Adds `member` to the set.
    async fn sadd(&self, key: &str, member: &str) -> StoreResult<()>;

    /// Removes `member` from the set.
    async fn srem(&self, key: &str, member: &str) -> StoreResult<()>;

    /// All members of the set.
    async fn smembers(&self, key: &str) -> StoreResult<Vec<String>>;

    // -- hashes --
    /// Sets `field` to `value` in the hash at `key`.
    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Fetches `field` from the hash at `key`.
    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Removes `field` from the hash at `key`.
    async fn hdel(&self, key: &str, field: &str) -> StoreResult<()>;

    /// All field/value pairs of the hash at `key`.
    async fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>>;

    // -- health --
    /// Best-effort connectivity flag, updated from operation outcomes.
    /// A `true` here is advisory; the next round trip can still fail.
    fn is_available(&self) -> bool;
}
