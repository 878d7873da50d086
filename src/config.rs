//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL; None runs with the in-process store
    pub redis_url: Option<String>,
    /// Base URL of the upstream metadata API
    pub tmdb_base_url: String,
    /// API key sent with every upstream request
    pub tmdb_api_key: String,
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for cached search results
    pub search_ttl: u64,
    /// TTL in seconds for cached movie/show detail payloads
    pub detail_ttl: u64,
    /// Maximum entries per bounded cache namespace (search results)
    pub search_index_limit: usize,
    /// Due-episode poll interval in seconds
    pub notify_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Redis connection URL (default: unset, in-process store)
    /// - `TMDB_BASE_URL` - Upstream API base URL (default: https://api.themoviedb.org/3)
    /// - `TMDB_API_KEY` - Upstream API key (default: empty)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SEARCH_TTL` - Search result TTL in seconds (default: 300)
    /// - `DETAIL_TTL` - Detail payload TTL in seconds (default: 3600)
    /// - `SEARCH_INDEX_LIMIT` - Max cached search entries per namespace (default: 1000)
    /// - `NOTIFY_INTERVAL` - Due-episode poll frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            tmdb_base_url: env::var("TMDB_BASE_URL")
                .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string()),
            tmdb_api_key: env::var("TMDB_API_KEY").unwrap_or_default(),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            search_ttl: env::var("SEARCH_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            detail_ttl: env::var("DETAIL_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            search_index_limit: env::var("SEARCH_INDEX_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            notify_interval: env::var("NOTIFY_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            tmdb_base_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_api_key: String::new(),
            server_port: 3000,
            search_ttl: 300,
            detail_ttl: 3600,
            search_index_limit: 1000,
            notify_interval: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.redis_url.is_none());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.search_ttl, 300);
        assert_eq!(config.detail_ttl, 3600);
        assert_eq!(config.search_index_limit, 1000);
        assert_eq!(config.notify_interval, 60);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("REDIS_URL");
        env::remove_var("TMDB_BASE_URL");
        env::remove_var("SERVER_PORT");
        env::remove_var("SEARCH_TTL");
        env::remove_var("DETAIL_TTL");
        env::remove_var("SEARCH_INDEX_LIMIT");
        env::remove_var("NOTIFY_INTERVAL");

        let config = Config::from_env();
        assert!(config.redis_url.is_none());
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.search_index_limit, 1000);
    }
}
