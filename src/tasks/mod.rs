//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Due-episode notifier: polls the scheduler and publishes aired episodes

mod notify;

pub use notify::{spawn_notifier_task, DueEpisode};
