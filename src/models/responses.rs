//! Response DTOs for the watchlist backend API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStatsSnapshot;

/// Response body after scheduling a show (POST /api/schedule)
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledResponse {
    /// "scheduled" or "tba"
    pub status: String,
    /// The show that was recorded
    pub show_id: String,
    /// Whether the write actually reached the store
    pub stored: bool,
}

impl ScheduledResponse {
    pub fn scheduled(show_id: impl Into<String>, stored: bool) -> Self {
        Self {
            status: "scheduled".to_string(),
            show_id: show_id.into(),
            stored,
        }
    }

    pub fn tba(show_id: impl Into<String>, stored: bool) -> Self {
        Self {
            status: "tba".to_string(),
            show_id: show_id.into(),
            stored,
        }
    }
}

/// One entry of the schedule snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledShow {
    pub show_id: String,
    pub air_date: DateTime<Utc>,
}

/// Response body for GET /api/schedule
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSnapshotResponse {
    pub scheduled: Vec<ScheduledShow>,
}

/// Response body for GET /api/schedule/due
#[derive(Debug, Clone, Serialize)]
pub struct DueShowsResponse {
    pub due: Vec<String>,
}

/// Response body for GET /api/tba
#[derive(Debug, Clone, Serialize)]
pub struct TbaResponse {
    pub shows: Vec<String>,
}

/// Response body after removing a show from a structure
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub show_id: String,
    pub removed: bool,
}

impl RemovedResponse {
    pub fn new(show_id: impl Into<String>, removed: bool) -> Self {
        Self {
            show_id: show_id.into(),
            removed,
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
    pub store_available: bool,
}

impl StatsResponse {
    pub fn new(stats: CacheStatsSnapshot, store_available: bool) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate,
            store_available,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_available: bool,
}

impl HealthResponse {
    /// The service is healthy even with the store down; requests fall
    /// through to the upstream API.
    pub fn healthy(store_available: bool) -> Self {
        Self {
            status: "ok".to_string(),
            store_available,
        }
    }
}
