//! Due-Episode Notifier Task
//!
//! Background task that periodically polls the scheduler for episodes
//! whose air date has passed and pushes them to subscribers.
//!
//! Delivery is at-least-once: a show is removed from the schedule only
//! after its event was published, so a crash in between re-reports it on
//! the next poll. Duplicates are preferred over lost notifications.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::schedule::{EpisodeScheduler, ShowMeta};

// == Due Episode Event ==
/// One aired episode, pushed to real-time subscribers.
#[derive(Debug, Clone)]
pub struct DueEpisode {
    /// Identifier of the show that aired
    pub show_id: String,
    /// Display metadata; None if the blob was lost or unreadable
    pub meta: Option<ShowMeta>,
}

/// Spawns a background task that polls for due episodes.
///
/// Every `poll_interval_secs` the task fetches the due list, publishes
/// each show on `events`, and acknowledges it via
/// `remove_from_schedule`. With the store unreachable the poll comes
/// back empty and the loop just idles until the next tick.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the
/// task during graceful shutdown.
pub fn spawn_notifier_task(
    scheduler: EpisodeScheduler,
    poll_interval_secs: u64,
    events: broadcast::Sender<DueEpisode>,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(poll_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting due-episode notifier with interval of {} seconds",
            poll_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let due = scheduler.due_shows().await;
            if due.is_empty() {
                debug!("Notifier poll: nothing due");
                continue;
            }
            info!("Notifier poll: {} show(s) due", due.len());

            for show_id in due {
                let meta = scheduler.show_meta(&show_id).await;
                match &meta {
                    Some(meta) => info!(
                        "Episode aired: {} ({}) of show {}",
                        meta.next_episode, meta.name, show_id
                    ),
                    None => info!("Episode aired for show {}", show_id),
                }

                // a send error only means nobody is subscribed right now;
                // the log line above is the baseline delivery
                let _ = events.send(DueEpisode {
                    show_id: show_id.clone(),
                    meta,
                });

                if !scheduler.remove_from_schedule(&show_id).await {
                    // still due next poll, duplicate over loss
                    warn!("Acknowledgment for {} failed, will re-report", show_id);
                }
            }
        }
    })
}
