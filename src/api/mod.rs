//! API Module
//!
//! HTTP handlers and routing for the watchlist backend REST API.
//!
//! The route surface is a thin wrapper: proxy endpoints delegate to the
//! cache and upstream client, schedule endpoints to the scheduler.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
