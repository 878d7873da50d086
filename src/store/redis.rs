//! Redis Store
//!
//! Production [`StoreClient`] backed by a redis `ConnectionManager`,
//! which multiplexes one auto-reconnecting connection across all
//! request tasks. Commands are serialized per connection; no ordering
//! is guaranteed across concurrent callers.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use tracing::{info, warn};

use super::{StoreClient, StoreError, StoreResult};

// == Redis Store ==
/// Redis-backed store client with a connectivity flag.
///
/// If the initial connection fails the client stays in a degraded state:
/// every operation reports [`StoreError::Unavailable`] and callers fall
/// through to live data. The process never aborts over a missing cache.
pub struct RedisStore {
    conn: Option<ConnectionManager>,
    available: AtomicBool,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connected", &self.conn.is_some())
            .field("available", &self.is_available())
            .finish()
    }
}

impl RedisStore {
    /// Connects to Redis at `url`.
    ///
    /// A failed initial connection is logged and produces a degraded
    /// client rather than an error; see the struct docs.
    pub async fn connect(url: &str) -> Self {
        info!("Connecting to store at {}", url);

        let conn = match redis::Client::open(url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => {
                    info!("Store connection established");
                    Some(conn)
                }
                Err(e) => {
                    warn!("Store connection failed, running degraded: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Invalid store URL, running degraded: {}", e);
                None
            }
        };

        let available = AtomicBool::new(conn.is_some());
        Self { conn, available }
    }

    /// Clones the managed connection for one command round trip.
    fn conn(&self) -> StoreResult<ConnectionManager> {
        self.conn
            .clone()
            .ok_or_else(|| StoreError::Unavailable("no connection".to_string()))
    }

    /// Records the outcome of a command on the availability flag and
    /// maps redis errors into [`StoreError`].
    fn track<T>(&self, result: RedisResult<T>) -> StoreResult<T> {
        match result {
            Ok(value) => {
                self.available.store(true, Ordering::Relaxed);
                Ok(value)
            }
            Err(e) => {
                self.available.store(false, Ordering::Relaxed);
                Err(StoreError::Unavailable(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl StoreClient for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn()?;
        self.track(conn.get(key).await)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await)
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.del::<_, ()>(key).await)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.expire::<_, ()>(key, ttl.as_secs() as i64).await)
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.zadd::<_, _, _, ()>(key, member, score).await)
    }

    async fn zrange_by_score_limit(
        &self,
        key: &str,
        min: f64,
        max: f64,
        count: isize,
    ) -> StoreResult<Vec<String>> {
        let mut conn = self.conn()?;
        if count < 0 {
            self.track(conn.zrangebyscore(key, min, max).await)
        } else {
            self.track(conn.zrangebyscore_limit(key, min, max, 0, count).await)
        }
    }

    async fn zrange_with_scores(&self, key: &str) -> StoreResult<Vec<(String, i64)>> {
        let mut conn = self.conn()?;
        self.track(conn.zrange_withscores(key, 0, -1).await)
    }

    async fn zrem(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.zrem::<_, _, ()>(key, member).await)
    }

    async fn zcard(&self, key: &str) -> StoreResult<usize> {
        let mut conn = self.conn()?;
        self.track(conn.zcard(key).await)
    }

    async fn sadd(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.sadd::<_, _, ()>(key, member).await)
    }

    async fn srem(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.srem::<_, _, ()>(key, member).await)
    }

    async fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.conn()?;
        self.track(conn.smembers(key).await)
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.hset::<_, _, _, ()>(key, field, value).await)
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn()?;
        self.track(conn.hget(key, field).await)
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<()> {
        let mut conn = self.conn()?;
        self.track(conn.hdel::<_, _, ()>(key, field).await)
    }

    async fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        let mut conn = self.conn()?;
        self.track(conn.hgetall(key).await)
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }
}
