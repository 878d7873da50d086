//! API Routes
//!
//! Configures the Axum router with all watchlist backend endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    due_handler, health_handler, movie_handler, remove_schedule_handler, schedule_handler,
    schedule_snapshot_handler, search_handler, stats_handler, tba_add_handler, tba_list_handler,
    tba_remove_handler, tv_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/search?query=&page=` - Cached metadata search proxy
/// - `GET /api/movie/:id` - Cached movie detail proxy
/// - `GET /api/tv/:id` - Cached TV detail proxy
/// - `POST /api/schedule` - Schedule a show (or park it as TBA)
/// - `GET /api/schedule` - Schedule snapshot
/// - `GET /api/schedule/due` - Shows whose air date has passed
/// - `DELETE /api/schedule/:id` - Acknowledge a due show
/// - `GET /api/tba` / `POST /api/tba/:id` / `DELETE /api/tba/:id`
/// - `GET /stats` - Cache counters
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/api/search", get(search_handler))
        .route("/api/movie/:id", get(movie_handler))
        .route("/api/tv/:id", get(tv_handler))
        .route("/api/schedule", post(schedule_handler))
        .route("/api/schedule", get(schedule_snapshot_handler))
        .route("/api/schedule/due", get(due_handler))
        .route("/api/schedule/:id", delete(remove_schedule_handler))
        .route("/api/tba", get(tba_list_handler))
        .route("/api/tba/:id", post(tba_add_handler))
        .route("/api/tba/:id", delete(tba_remove_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemoryStore;
    use crate::tmdb::TmdbClient;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let tmdb = TmdbClient::new("http://127.0.0.1:9", "test-key");
        create_router(AppState::new(store, tmdb, &Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/search?query=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_schedule_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/schedule")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"show_id":"42","air_date":"2025-06-01T20:00:00Z","name":"Dark"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
