//! Showtrack - watchlist metadata cache and episode scheduler
//!
//! Backend core for a personal media watchlist: a best-effort caching
//! layer in front of the TMDB metadata API and a scheduler for upcoming
//! episode air dates, both over one shared expiring key-value store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod schedule;
pub mod store;
pub mod tasks;
pub mod tmdb;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_notifier_task;
