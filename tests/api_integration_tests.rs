//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle over the in-memory store, with
//! a stub upstream metadata server bound to an ephemeral port.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use showtrack::{create_router, AppState, Config};
use showtrack::store::MemoryStore;
use showtrack::tmdb::TmdbClient;
use tower::util::ServiceExt;

// == Helper Functions ==

/// Serves a minimal TMDB lookalike and returns its base URL.
async fn spawn_stub_upstream() -> String {
    let app = Router::new()
        .route(
            "/search/multi",
            get(|| async { Json(json!({ "page": 1, "results": [{ "id": 42, "name": "Dark" }] })) }),
        )
        .route(
            "/movie/:id",
            get(|Path(id): Path<String>| async move {
                Json(json!({ "id": id, "title": "The Matrix" }))
            }),
        )
        .route(
            "/tv/:id",
            get(|Path(id): Path<String>| async move { Json(json!({ "id": id, "name": "Dark" })) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn create_test_app(upstream: &str) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let tmdb = TmdbClient::new(upstream, "test-key");
    let app = create_router(AppState::new(store.clone(), tmdb, &Config::default()));
    (app, store)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn cache_header(response: &axum::response::Response) -> String {
    response
        .headers()
        .get("x-cache")
        .expect("cache-eligible response must carry X-Cache")
        .to_str()
        .unwrap()
        .to_string()
}

// == Proxy Endpoint Tests ==

#[tokio::test]
async fn test_search_miss_then_hit() {
    let upstream = spawn_stub_upstream().await;
    let (app, _store) = create_test_app(&upstream).await;

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/search?query=dark")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(cache_header(&first), "MISS");
    let first_body = body_to_json(first.into_body()).await;

    let second = app
        .oneshot(
            Request::builder()
                .uri("/api/search?query=dark")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(cache_header(&second), "HIT");
    let second_body = body_to_json(second.into_body()).await;

    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn test_movie_detail_cached() {
    let upstream = spawn_stub_upstream().await;
    let (app, _store) = create_test_app(&upstream).await;

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/movie/603")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cache_header(&first), "MISS");
    assert_eq!(body_to_json(first.into_body()).await["id"], "603");

    let second = app
        .oneshot(
            Request::builder()
                .uri("/api/movie/603")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cache_header(&second), "HIT");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    // nothing listens on the ephemeral port once this listener drops
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_upstream = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (app, _store) = create_test_app(&dead_upstream).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tv/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_store_outage_degrades_to_passthrough() {
    let upstream = spawn_stub_upstream().await;
    let (app, store) = create_test_app(&upstream).await;
    store.set_available(false);

    // every request falls through to the upstream and reports MISS
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/search?query=dark")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(cache_header(&response), "MISS");
    }
}

// == Schedule Endpoint Tests ==

#[tokio::test]
async fn test_schedule_due_acknowledge_flow() {
    let upstream = spawn_stub_upstream().await;
    let (app, _store) = create_test_app(&upstream).await;

    // air date in the past makes the show immediately due
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/schedule")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"show_id":"42","air_date":"2025-01-01T00:00:00Z","name":"Dark","next_episode":"S03E01"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "scheduled");
    assert_eq!(json["stored"], true);

    // due until acknowledged
    let due = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/schedule/due")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(due.into_body()).await;
    assert_eq!(json["due"], json!(["42"]));

    let ack = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/schedule/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ack.status(), StatusCode::OK);

    let due = app
        .oneshot(
            Request::builder()
                .uri("/api/schedule/due")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(due.into_body()).await;
    assert_eq!(json["due"], json!([]));
}

#[tokio::test]
async fn test_tba_moves_to_schedule_when_date_announced() {
    let upstream = spawn_stub_upstream().await;
    let (app, _store) = create_test_app(&upstream).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tba/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tba = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/tba")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_to_json(tba.into_body()).await["shows"], json!(["42"]));

    // date announced: show must leave the TBA bucket
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/schedule")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"show_id":"42","air_date":"2099-06-01T20:00:00Z","name":"Dark"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let tba = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/tba")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_to_json(tba.into_body()).await["shows"], json!([]));

    let snapshot = app
        .oneshot(
            Request::builder()
                .uri("/api/schedule")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(snapshot.into_body()).await;
    assert_eq!(json["scheduled"][0]["show_id"], "42");
}

// == Diagnostics Tests ==

#[tokio::test]
async fn test_stats_reflect_traffic() {
    let upstream = spawn_stub_upstream().await;
    let (app, _store) = create_test_app(&upstream).await;

    // one miss, one hit
    for _ in 0..2 {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/tv/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["store_available"], true);
}

#[tokio::test]
async fn test_health_endpoint() {
    let upstream = spawn_stub_upstream().await;
    let (app, store) = create_test_app(&upstream).await;
    store.set_available(false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // healthy even with the store down
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store_available"], false);
}
