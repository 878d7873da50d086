//! In-Memory Store
//!
//! [`StoreClient`] implementation over a process-local HashMap with lazy
//! TTL expiry. Used by the test suite and by deployments without a
//! `REDIS_URL`. An availability toggle lets tests exercise the degraded
//! paths without a real network failure.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{current_timestamp_ms, StoreClient, StoreError, StoreResult};

// == Stored Values ==
/// One stored value; each key holds exactly one shape.
#[derive(Debug, Clone)]
enum Value {
    Str(String),
    ZSet(HashMap<String, i64>),
    Set(HashSet<String>),
    Hash(HashMap<String, String>),
}

/// A stored entry with optional expiry (Unix milliseconds).
#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    /// None = no expiration
    expires_at: Option<u64>,
}

impl Entry {
    fn new(value: Value, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|t| current_timestamp_ms() + t.as_millis() as u64);
        Self { value, expires_at }
    }

    /// An entry is expired once current time >= expiration time.
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

// == Memory Store ==
/// Process-local store with the same primitives as Redis.
///
/// The mutex is held only for the duration of one operation; there is
/// never an await point inside the critical section.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated availability. While unavailable, every
    /// operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::Relaxed);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            Err(StoreError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }

    /// Drops `key` if its entry has expired, then returns whether a
    /// live entry remains.
    fn purge_expired(entries: &mut HashMap<String, Entry>, key: &str) -> bool {
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        entries.contains_key(key)
    }

    /// Number of live entries, for diagnostics in tests.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.values().filter(|e| !e.is_expired()).count()
    }

    /// Returns true if the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if !Self::purge_expired(&mut entries, key) {
            return Ok(None);
        }
        match &entries[key].value {
            Value::Str(s) => Ok(Some(s.clone())),
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry::new(Value::Str(value.to_string()), Some(ttl)),
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if Self::purge_expired(&mut entries, key) {
            let expires_at = current_timestamp_ms() + ttl.as_millis() as u64;
            if let Some(entry) = entries.get_mut(key) {
                entry.expires_at = Some(expires_at);
            }
        }
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::ZSet(HashMap::new()), None));
        match &mut entry.value {
            Value::ZSet(members) => {
                members.insert(member.to_string(), score);
            }
            // wrong-type key: replace, our keyspace never mixes shapes
            other => {
                *other = Value::ZSet(HashMap::from([(member.to_string(), score)]));
            }
        }
        Ok(())
    }

    async fn zrange_by_score_limit(
        &self,
        key: &str,
        min: f64,
        max: f64,
        count: isize,
    ) -> StoreResult<Vec<String>> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if !Self::purge_expired(&mut entries, key) {
            return Ok(Vec::new());
        }
        let Value::ZSet(members) = &entries[key].value else {
            return Ok(Vec::new());
        };
        let mut in_range: Vec<(i64, String)> = members
            .iter()
            .filter(|(_, &score)| (score as f64) >= min && (score as f64) <= max)
            .map(|(member, &score)| (score, member.clone()))
            .collect();
        in_range.sort();
        if count >= 0 {
            in_range.truncate(count as usize);
        }
        Ok(in_range.into_iter().map(|(_, member)| member).collect())
    }

    async fn zrange_with_scores(&self, key: &str) -> StoreResult<Vec<(String, i64)>> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if !Self::purge_expired(&mut entries, key) {
            return Ok(Vec::new());
        }
        let Value::ZSet(members) = &entries[key].value else {
            return Ok(Vec::new());
        };
        let mut all: Vec<(i64, String)> = members
            .iter()
            .map(|(member, &score)| (score, member.clone()))
            .collect();
        all.sort();
        Ok(all.into_iter().map(|(score, member)| (member, score)).collect())
    }

    async fn zrem(&self, key: &str, member: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            if let Value::ZSet(members) = &mut entry.value {
                members.remove(member);
            }
        }
        Ok(())
    }

    async fn zcard(&self, key: &str) -> StoreResult<usize> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if !Self::purge_expired(&mut entries, key) {
            return Ok(0);
        }
        match &entries[key].value {
            Value::ZSet(members) => Ok(members.len()),
            _ => Ok(0),
        }
    }

    async fn sadd(&self, key: &str, member: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Set(HashSet::new()), None));
        match &mut entry.value {
            Value::Set(members) => {
                members.insert(member.to_string());
            }
            other => {
                *other = Value::Set(HashSet::from([member.to_string()]));
            }
        }
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            if let Value::Set(members) = &mut entry.value {
                members.remove(member);
            }
        }
        Ok(())
    }

    async fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if !Self::purge_expired(&mut entries, key) {
            return Ok(Vec::new());
        }
        match &entries[key].value {
            Value::Set(members) => {
                let mut all: Vec<String> = members.iter().cloned().collect();
                all.sort();
                Ok(all)
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        Self::purge_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::Hash(HashMap::new()), None));
        match &mut entry.value {
            Value::Hash(fields) => {
                fields.insert(field.to_string(), value.to_string());
            }
            other => {
                *other = Value::Hash(HashMap::from([(field.to_string(), value.to_string())]));
            }
        }
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if !Self::purge_expired(&mut entries, key) {
            return Ok(None);
        }
        match &entries[key].value {
            Value::Hash(fields) => Ok(fields.get(field).cloned()),
            _ => Ok(None),
        }
    }

    async fn hdel(&self, key: &str, field: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get_mut(key) {
            if let Value::Hash(fields) = &mut entry.value {
                fields.remove(field);
            }
        }
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<Vec<(String, String)>> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        if !Self::purge_expired(&mut entries, key) {
            return Ok(Vec::new());
        }
        match &entries[key].value {
            Value::Hash(fields) => Ok(fields
                .iter()
                .map(|(f, v)| (f.clone(), v.clone()))
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::Relaxed)
    }
}
