//! Cache Keys
//!
//! Central place for the namespaced key layout of the store. Keys are
//! grouped by category so each namespace can carry its own TTL and, for
//! unbounded categories like search, its own eviction index.

// == Cache Keys ==
#[derive(Debug, Clone, Copy)]
pub struct CacheKeys;

impl CacheKeys {
    /// One page of search results for a query.
    pub fn search(query: &str, page: u32) -> String {
        format!("tmdb:search:{}:{page}", query.to_lowercase())
    }

    /// Eviction index over the search namespace.
    pub fn search_index() -> String {
        "index:tmdb:search".to_string()
    }

    /// Movie detail payload.
    pub fn movie(id: &str) -> String {
        format!("tmdb:movie:{id}")
    }

    /// TV show detail payload.
    pub fn tv(id: &str) -> String {
        format!("tmdb:tv:{id}")
    }
}
