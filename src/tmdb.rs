//! Upstream Metadata Client
//!
//! Thin fetch-by-endpoint client for the TMDB-style metadata API. No
//! caching happens at this level and there are no retries: an upstream
//! failure is a hard error the calling request surfaces to the user.

use serde_json::Value;
use tracing::debug;

use crate::error::AppError;

// == Tmdb Client ==
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Creates a client for the API at `base_url` authenticating with
    /// `api_key`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetches `path` with the given query parameters and returns the
    /// raw JSON payload.
    pub async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        debug!("Upstream fetch: {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "upstream returned {status} for {path}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid JSON from {path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let client = TmdbClient::new("https://example.test/3/", "k");
        assert_eq!(client.base_url, "https://example.test/3/");
    }
}
