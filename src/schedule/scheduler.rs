//! Episode Scheduler
//!
//! Time-ordered structure of upcoming episode releases plus a separate
//! bucket for shows whose next air date is still unannounced (TBA).
//!
//! A tracked show is in one of three states: TBA, scheduled with an air
//! timestamp, or gone (consumed after its due notification was
//! acknowledged). It is never in the TBA set and the schedule at once.
//!
//! The scheduler is a notification aid, not a record of truth: the
//! watchlist document's air-date field stays authoritative, and every
//! operation here degrades to a no-op or empty result when the store is
//! unreachable. Mutations report success as a bool so callers can tell
//! whether the write actually landed.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::SharedStore;

// == Store Layout ==
/// Sorted set of show ids scored by air timestamp (unix millis).
const SCHEDULE_KEY: &str = "schedule:episodes";
/// Hash of show id -> serialized [`ShowMeta`].
const META_KEY: &str = "schedule:meta";
/// Set of show ids with no announced air date.
const TBA_KEY: &str = "schedule:tba";

// == Show Metadata ==
/// Display payload carried alongside a scheduled entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowMeta {
    /// Display name of the show
    pub name: String,
    /// Label of the upcoming episode, e.g. "S02E05"
    pub next_episode: String,
}

// == Episode Scheduler ==
#[derive(Clone)]
pub struct EpisodeScheduler {
    store: SharedStore,
}

impl EpisodeScheduler {
    /// Creates a scheduler over the given store handle.
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    // == Schedule ==
    /// Schedules (or reschedules) a show's next episode.
    ///
    /// Removes the show from the TBA bucket first, then upserts the
    /// schedule entry and its metadata. Re-adding a show replaces the
    /// prior entry; there is never more than one entry per show. The
    /// steps are separate round trips with no transaction; a crash in
    /// between is reconciled on the next full sync from the watchlist.
    pub async fn schedule_episode(
        &self,
        show_id: &str,
        air_date: DateTime<Utc>,
        meta: &ShowMeta,
    ) -> bool {
        if let Err(e) = self.store.srem(TBA_KEY, show_id).await {
            warn!("Schedule of {} degraded: {}", show_id, e);
            return false;
        }

        if let Err(e) = self
            .store
            .zadd(SCHEDULE_KEY, show_id, air_date.timestamp_millis())
            .await
        {
            warn!("Schedule of {} degraded: {}", show_id, e);
            return false;
        }

        let json = match serde_json::to_string(meta) {
            Ok(json) => json,
            Err(e) => {
                warn!("Metadata for {} unserializable: {}", show_id, e);
                return false;
            }
        };
        if let Err(e) = self.store.hset(META_KEY, show_id, &json).await {
            warn!("Metadata write for {} degraded: {}", show_id, e);
            return false;
        }

        debug!("Scheduled {} for {}", show_id, air_date);
        true
    }

    // == TBA ==
    /// Moves a show to the TBA bucket: drops any schedule entry and
    /// metadata, then records set membership.
    pub async fn add_tba(&self, show_id: &str) -> bool {
        if let Err(e) = self.store.zrem(SCHEDULE_KEY, show_id).await {
            warn!("TBA move of {} degraded: {}", show_id, e);
            return false;
        }
        if let Err(e) = self.store.hdel(META_KEY, show_id).await {
            warn!("TBA move of {} degraded: {}", show_id, e);
            return false;
        }
        if let Err(e) = self.store.sadd(TBA_KEY, show_id).await {
            warn!("TBA move of {} degraded: {}", show_id, e);
            return false;
        }
        debug!("Marked {} as TBA", show_id);
        true
    }

    /// Removes a show from the TBA bucket (untracked or date announced).
    pub async fn remove_tba(&self, show_id: &str) -> bool {
        match self.store.srem(TBA_KEY, show_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("TBA removal of {} degraded: {}", show_id, e);
                false
            }
        }
    }

    /// All shows currently waiting on an air date.
    pub async fn tba_shows(&self) -> Vec<String> {
        match self.store.smembers(TBA_KEY).await {
            Ok(members) => members,
            Err(e) => {
                warn!("TBA listing degraded: {}", e);
                Vec::new()
            }
        }
    }

    // == Due Polling ==
    /// Shows whose air timestamp has passed. Non-destructive and
    /// idempotent: entries stay until [`EpisodeScheduler::remove_from_schedule`]
    /// acknowledges them, so an interrupted notifier sees them again.
    pub async fn due_shows(&self) -> Vec<String> {
        self.due_shows_at(Utc::now()).await
    }

    /// Like [`EpisodeScheduler::due_shows`] with an explicit clock.
    pub async fn due_shows_at(&self, now: DateTime<Utc>) -> Vec<String> {
        match self
            .store
            .zrange_by_score_limit(
                SCHEDULE_KEY,
                f64::NEG_INFINITY,
                now.timestamp_millis() as f64,
                -1,
            )
            .await
        {
            Ok(due) => due,
            Err(e) => {
                warn!("Due poll degraded: {}", e);
                Vec::new()
            }
        }
    }

    /// Full snapshot of the schedule, for diagnostics.
    pub async fn all_scheduled(&self) -> Vec<(String, DateTime<Utc>)> {
        match self.store.zrange_with_scores(SCHEDULE_KEY).await {
            Ok(entries) => entries
                .into_iter()
                .filter_map(|(show_id, millis)| {
                    Utc.timestamp_millis_opt(millis)
                        .single()
                        .map(|air_date| (show_id, air_date))
                })
                .collect(),
            Err(e) => {
                warn!("Schedule snapshot degraded: {}", e);
                Vec::new()
            }
        }
    }

    /// Metadata blob for a scheduled show, if any.
    pub async fn show_meta(&self, show_id: &str) -> Option<ShowMeta> {
        let json = match self.store.hget(META_KEY, show_id).await {
            Ok(json) => json?,
            Err(e) => {
                warn!("Metadata read for {} degraded: {}", show_id, e);
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("Metadata for {} unreadable: {}", show_id, e);
                None
            }
        }
    }

    // == Acknowledge ==
    /// Drops a show from the schedule after its due notification was
    /// delivered. Not calling this re-reports the show on the next poll;
    /// delivery favors duplicates over loss.
    pub async fn remove_from_schedule(&self, show_id: &str) -> bool {
        if let Err(e) = self.store.zrem(SCHEDULE_KEY, show_id).await {
            warn!("Schedule removal of {} degraded: {}", show_id, e);
            return false;
        }
        if let Err(e) = self.store.hdel(META_KEY, show_id).await {
            warn!("Metadata removal of {} degraded: {}", show_id, e);
            return false;
        }
        debug!("Removed {} from schedule", show_id);
        true
    }
}
