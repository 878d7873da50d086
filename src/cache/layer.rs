//! Cache Layer
//!
//! Best-effort metadata cache over the shared store, plus the bounded
//! namespace evictor.
//!
//! Nothing in this module returns an error to callers. A lookup comes
//! back as [`Lookup::Hit`], [`Lookup::Miss`], or [`Lookup::Unavailable`];
//! the latter two mean the same thing to a request handler (go fetch
//! live), but staying distinct internally keeps the degrade contract
//! visible to tests. Writes log failures and swallow them: caching is an
//! optimization, never a correctness dependency.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::store::{current_timestamp_ms, SharedStore};

use super::{CacheStats, CacheStatsSnapshot};

// == Lookup Result ==
/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Value was present, unexpired, and deserialized cleanly
    Hit(T),
    /// Value absent, expired, or unreadable
    Miss,
    /// Store unreachable; observably identical to a miss
    Unavailable,
}

impl<T> Lookup<T> {
    /// Returns true only for a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Collapses miss and unavailable into `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Unavailable => None,
        }
    }
}

// == Meta Cache ==
/// Serialization boundary over the store: values go in and out as JSON,
/// callers pick the concrete type per key namespace.
#[derive(Clone)]
pub struct MetaCache {
    store: SharedStore,
    stats: Arc<CacheStats>,
}

impl MetaCache {
    /// Creates a cache over the given store handle.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Current hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Advisory store connectivity, for the health endpoint.
    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    // == Get ==
    /// Looks up `key` and deserializes the stored JSON into `T`.
    ///
    /// Store failures and malformed payloads never propagate: the former
    /// is an [`Lookup::Unavailable`], the latter a [`Lookup::Miss`].
    /// Both count as misses in the stats.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Lookup<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Cache GET {} degraded: {}", key, e);
                self.stats.record_miss();
                return Lookup::Unavailable;
            }
        };

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => {
                    debug!("Cache HIT: {}", key);
                    self.stats.record_hit();
                    Lookup::Hit(value)
                }
                Err(e) => {
                    warn!("Cache payload unreadable at {}, treating as miss: {}", key, e);
                    self.stats.record_miss();
                    Lookup::Miss
                }
            },
            None => {
                debug!("Cache MISS: {}", key);
                self.stats.record_miss();
                Lookup::Miss
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key` with the given TTL. Best-effort:
    /// failures are logged and swallowed.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Cache SET {} skipped, unserializable value: {}", key, e);
                return;
            }
        };

        if let Err(e) = self
            .store
            .set_ex(key, &json, Duration::from_secs(ttl_seconds))
            .await
        {
            warn!("Cache SET {} degraded: {}", key, e);
        }
    }

    // == Set With Limit ==
    /// Stores `value` as in [`MetaCache::set`] and records the key in the
    /// namespace index at `index_key`, then trims the namespace down to
    /// `limit` entries, oldest insertion first.
    ///
    /// The index carries twice the entry TTL so references to expired
    /// entries die on their own even if eviction never runs again. The
    /// four steps are independent round trips; a failure mid-sequence
    /// leaves at worst a harmless orphan index entry.
    pub async fn set_with_limit<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
        index_key: &str,
        limit: usize,
    ) {
        self.set(key, value, ttl_seconds).await;

        let inserted_at = current_timestamp_ms() as i64;
        if let Err(e) = self.store.zadd(index_key, key, inserted_at).await {
            warn!("Cache index {} degraded: {}", index_key, e);
            return;
        }
        if let Err(e) = self
            .store
            .expire(index_key, Duration::from_secs(ttl_seconds * 2))
            .await
        {
            warn!("Cache index {} expire degraded: {}", index_key, e);
        }

        self.evict_overflow(index_key, limit).await;
    }

    /// Deletes the oldest entries of a namespace until it fits `limit`.
    ///
    /// Concurrent writers can race the count check; evicting slightly
    /// more or fewer than the exact overflow is fine, the bound holds
    /// eventually.
    async fn evict_overflow(&self, index_key: &str, limit: usize) {
        let count = match self.store.zcard(index_key).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Cache index {} count degraded: {}", index_key, e);
                return;
            }
        };
        if count <= limit {
            return;
        }

        let overflow = count - limit;
        let oldest = match self
            .store
            .zrange_by_score_limit(index_key, f64::NEG_INFINITY, f64::INFINITY, overflow as isize)
            .await
        {
            Ok(oldest) => oldest,
            Err(e) => {
                warn!("Cache index {} range degraded: {}", index_key, e);
                return;
            }
        };

        for stale_key in oldest {
            // value first, then the index entry
            if let Err(e) = self.store.del(&stale_key).await {
                warn!("Eviction of {} degraded: {}", stale_key, e);
                continue;
            }
            if let Err(e) = self.store.zrem(index_key, &stale_key).await {
                warn!("Index removal of {} degraded: {}", stale_key, e);
                continue;
            }
            self.stats.record_eviction();
            debug!("Evicted {} from {}", stale_key, index_key);
        }
    }
}
