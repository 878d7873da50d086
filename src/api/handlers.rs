//! API Handlers
//!
//! HTTP request handlers for the watchlist backend endpoints.
//!
//! The proxy handlers follow one pattern: check the cache, fall through
//! to the upstream API on miss or store outage, store the result
//! best-effort, and mark the response with an `X-Cache: HIT|MISS`
//! header. Upstream failures are the only errors surfaced to callers.

use axum::{
    extract::{Path, Query, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::cache::{CacheKeys, Lookup, MetaCache};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    DueShowsResponse, HealthResponse, RemovedResponse, ScheduleRequest, ScheduleSnapshotResponse,
    ScheduledResponse, ScheduledShow, StatsResponse, TbaResponse,
};
use crate::schedule::{EpisodeScheduler, ShowMeta};
use crate::store::SharedStore;
use crate::tmdb::TmdbClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Metadata cache over the shared store
    pub cache: MetaCache,
    /// Episode air-date scheduler over the same store
    pub scheduler: EpisodeScheduler,
    /// Upstream metadata API client
    pub tmdb: TmdbClient,
    /// TTL in seconds for cached search results
    pub search_ttl: u64,
    /// TTL in seconds for cached detail payloads
    pub detail_ttl: u64,
    /// Entry bound of the search namespace
    pub search_index_limit: usize,
}

impl AppState {
    /// Creates the application state over a store handle.
    pub fn new(store: SharedStore, tmdb: TmdbClient, config: &Config) -> Self {
        Self {
            cache: MetaCache::new(store.clone()),
            scheduler: EpisodeScheduler::new(store),
            tmdb,
            search_ttl: config.search_ttl,
            detail_ttl: config.detail_ttl,
            search_index_limit: config.search_index_limit,
        }
    }
}

/// Wraps a JSON payload and stamps the cache observability header.
fn cached_json(payload: Value, hit: bool) -> Response {
    let mut response = Json(payload).into_response();
    response.headers_mut().insert(
        "x-cache",
        HeaderValue::from_static(if hit { "HIT" } else { "MISS" }),
    );
    response
}

// == Proxy Handlers ==

/// Query parameters for GET /api/search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// Handler for GET /api/search
///
/// Search results are an unbounded namespace (every distinct query makes
/// a new key), so writes go through the bounded evictor.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    if params.query.trim().is_empty() {
        return Err(AppError::InvalidRequest("query cannot be empty".to_string()));
    }

    let key = CacheKeys::search(&params.query, params.page);
    if let Lookup::Hit(payload) = state.cache.get::<Value>(&key).await {
        return Ok(cached_json(payload, true));
    }

    let page = params.page.to_string();
    let payload = state
        .tmdb
        .fetch("search/multi", &[("query", &params.query), ("page", &page)])
        .await?;
    state
        .cache
        .set_with_limit(
            &key,
            &payload,
            state.search_ttl,
            &CacheKeys::search_index(),
            state.search_index_limit,
        )
        .await;

    Ok(cached_json(payload, false))
}

/// Shared body of the two detail proxies: detail payloads are keyed by
/// id, a naturally bounded namespace, so a plain TTL write suffices.
async fn detail_lookup(
    state: &AppState,
    cache_key: String,
    upstream_path: String,
) -> Result<Response> {
    if let Lookup::Hit(payload) = state.cache.get::<Value>(&cache_key).await {
        return Ok(cached_json(payload, true));
    }

    let payload = state.tmdb.fetch(&upstream_path, &[]).await?;
    state.cache.set(&cache_key, &payload, state.detail_ttl).await;
    Ok(cached_json(payload, false))
}

/// Handler for GET /api/movie/:id
pub async fn movie_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    detail_lookup(&state, CacheKeys::movie(&id), format!("movie/{id}")).await
}

/// Handler for GET /api/tv/:id
pub async fn tv_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    detail_lookup(&state, CacheKeys::tv(&id), format!("tv/{id}")).await
}

// == Schedule Handlers ==

/// Handler for POST /api/schedule
///
/// A known air date schedules the show; an absent one parks it in the
/// TBA bucket. Either way the show ends up in exactly one structure.
pub async fn schedule_handler(
    State(state): State<AppState>,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<ScheduledResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let response = match req.air_date {
        Some(air_date) => {
            let meta = ShowMeta {
                name: req.name,
                next_episode: req.next_episode.unwrap_or_default(),
            };
            let stored = state
                .scheduler
                .schedule_episode(&req.show_id, air_date, &meta)
                .await;
            ScheduledResponse::scheduled(req.show_id, stored)
        }
        None => {
            let stored = state.scheduler.add_tba(&req.show_id).await;
            ScheduledResponse::tba(req.show_id, stored)
        }
    };

    Ok(Json(response))
}

/// Handler for GET /api/schedule
pub async fn schedule_snapshot_handler(
    State(state): State<AppState>,
) -> Json<ScheduleSnapshotResponse> {
    let scheduled = state
        .scheduler
        .all_scheduled()
        .await
        .into_iter()
        .map(|(show_id, air_date)| ScheduledShow { show_id, air_date })
        .collect();
    Json(ScheduleSnapshotResponse { scheduled })
}

/// Handler for GET /api/schedule/due
pub async fn due_handler(State(state): State<AppState>) -> Json<DueShowsResponse> {
    Json(DueShowsResponse {
        due: state.scheduler.due_shows().await,
    })
}

/// Handler for DELETE /api/schedule/:id
///
/// Acknowledgment after a due show was processed; until it arrives the
/// show keeps showing up in due polls.
pub async fn remove_schedule_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<RemovedResponse> {
    let removed = state.scheduler.remove_from_schedule(&id).await;
    Json(RemovedResponse::new(id, removed))
}

// == TBA Handlers ==

/// Handler for GET /api/tba
pub async fn tba_list_handler(State(state): State<AppState>) -> Json<TbaResponse> {
    Json(TbaResponse {
        shows: state.scheduler.tba_shows().await,
    })
}

/// Handler for POST /api/tba/:id
pub async fn tba_add_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ScheduledResponse> {
    let stored = state.scheduler.add_tba(&id).await;
    Json(ScheduledResponse::tba(id, stored))
}

/// Handler for DELETE /api/tba/:id
pub async fn tba_remove_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<RemovedResponse> {
    let removed = state.scheduler.remove_tba(&id).await;
    Json(RemovedResponse::new(id, removed))
}

// == Diagnostics Handlers ==

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.cache.stats(),
        state.cache.is_available(),
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.is_available()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn test_state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        let tmdb = TmdbClient::new("http://127.0.0.1:9", "test-key");
        AppState::new(store, tmdb, &Config::default())
    }

    #[tokio::test]
    async fn test_schedule_handler_known_date() {
        let state = test_state();
        let req = ScheduleRequest {
            show_id: "42".to_string(),
            air_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap()),
            name: "Dark".to_string(),
            next_episode: Some("S02E05".to_string()),
        };

        let Json(resp) = schedule_handler(State(state.clone()), Json(req))
            .await
            .unwrap();
        assert_eq!(resp.status, "scheduled");
        assert!(resp.stored);
        assert_eq!(state.scheduler.all_scheduled().await.len(), 1);
    }

    #[tokio::test]
    async fn test_schedule_handler_unknown_date_goes_tba() {
        let state = test_state();
        let req = ScheduleRequest {
            show_id: "42".to_string(),
            air_date: None,
            name: "Dark".to_string(),
            next_episode: None,
        };

        let Json(resp) = schedule_handler(State(state.clone()), Json(req))
            .await
            .unwrap();
        assert_eq!(resp.status, "tba");
        assert_eq!(state.scheduler.tba_shows().await, vec!["42".to_string()]);
        assert!(state.scheduler.all_scheduled().await.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_handler_rejects_empty_show_id() {
        let state = test_state();
        let req = ScheduleRequest {
            show_id: String::new(),
            air_date: None,
            name: "Dark".to_string(),
            next_episode: None,
        };

        let result = schedule_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_search_handler_upstream_down_is_bad_gateway() {
        // bind an ephemeral port and drop it so nothing listens there;
        // the cache is empty, so the fall-through fetch must surface an
        // upstream error
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_upstream = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let store = Arc::new(MemoryStore::new());
        let tmdb = TmdbClient::new(dead_upstream, "test-key");
        let state = AppState::new(store, tmdb, &Config::default());
        let params = SearchParams {
            query: "dark".to_string(),
            page: 1,
        };

        let result = search_handler(State(state), Query(params)).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));
    }
}
