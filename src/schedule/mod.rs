//! Schedule Module
//!
//! Tracks upcoming episode air dates for watchlisted shows.

mod scheduler;

pub use scheduler::{EpisodeScheduler, ShowMeta};
