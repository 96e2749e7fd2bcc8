use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aw_context_lib::{ContextError, ErrorKind, TrackerClient};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Seen {
    events_query: Arc<Mutex<Option<(String, HashMap<String, String>)>>>,
    query_body: Arc<Mutex<Option<Value>>>,
}

fn buckets_body(with_watcher: bool) -> Value {
    let mut buckets = json!({
        "aw-watcher-afk_host": {
            "id": "aw-watcher-afk_host",
            "name": null,
            "type": "afkstatus",
            "client": "aw-watcher-afk",
            "hostname": "host",
            "created": "2024-12-01T08:00:00.000000+00:00"
        }
    });
    if with_watcher {
        buckets["aw-watcher-window_host"] = json!({
            "id": "aw-watcher-window_host",
            "name": "window",
            "type": "currentwindow",
            "client": "aw-watcher-window",
            "hostname": "host",
            "created": "2024-12-01T08:00:00.000000+01:00"
        });
    }
    buckets
}

fn events_body() -> Value {
    json!([
        {"id": 2, "timestamp": "2024-12-06T10:05:00.000000+00:00", "duration": 30.5,
         "data": {"app": "Code", "title": "main.rs"}},
        {"id": 1, "timestamp": "2024-12-06T10:00:00Z", "duration": 300.0,
         "data": {"app": "Slack", "title": "general"}}
    ])
}

fn tracker_router(seen: Seen, with_watcher: bool) -> Router {
    Router::new()
        .route(
            "/api/0/buckets/",
            get(move || async move { Json(buckets_body(with_watcher)) }),
        )
        .route(
            "/api/0/buckets/:id/events",
            get(
                |State(seen): State<Seen>,
                 Path(id): Path<String>,
                 Query(params): Query<HashMap<String, String>>| async move {
                    *seen.events_query.lock().unwrap() = Some((id, params));
                    Json(events_body())
                },
            ),
        )
        .route(
            "/api/0/query/",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                *seen.query_body.lock().unwrap() = Some(body);
                Json(json!([events_body(), []]))
            }),
        )
        .with_state(seen)
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> TrackerClient {
    TrackerClient::new(base, Duration::from_secs(5), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn lists_buckets_and_finds_window_watcher() {
    let base = serve(tracker_router(Seen::default(), true)).await;
    let tracker = client(&base);

    let buckets = tracker.buckets().await.unwrap();
    let ids: Vec<&str> = buckets.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["aw-watcher-afk_host", "aw-watcher-window_host"]);

    let watcher = tracker.window_watcher_bucket().await.unwrap().unwrap();
    assert_eq!(watcher.id, "aw-watcher-window_host");
    assert_eq!(watcher.created, Utc.with_ymd_and_hms(2024, 12, 1, 7, 0, 0).unwrap());
}

#[tokio::test]
async fn missing_window_watcher_is_not_found() {
    let base = serve(tracker_router(Seen::default(), false)).await;
    let tracker = client(&base);

    assert!(tracker.window_watcher_bucket().await.unwrap().is_none());
    let err = tracker.require_window_watcher_bucket().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn events_send_range_and_limit() {
    let seen = Seen::default();
    let base = serve(tracker_router(seen.clone(), true)).await;
    let tracker = client(&base);

    let start = Utc.with_ymd_and_hms(2024, 12, 6, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 12, 6, 23, 59, 59).unwrap();
    let events = tracker
        .events("aw-watcher-window_host", start, end, 25)
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].data.app, "Code");
    assert_eq!(events[1].timestamp, Utc.with_ymd_and_hms(2024, 12, 6, 10, 0, 0).unwrap());

    let (id, params) = seen.events_query.lock().unwrap().clone().unwrap();
    assert_eq!(id, "aw-watcher-window_host");
    assert_eq!(params["start"], "2024-12-06T00:00:00.000000+00:00");
    assert_eq!(params["end"], "2024-12-06T23:59:59.000000+00:00");
    assert_eq!(params["limit"], "25");
}

#[tokio::test]
async fn day_events_runs_a_flood_query() {
    let seen = Seen::default();
    let base = serve(tracker_router(seen.clone(), true)).await;
    let tracker = client(&base);

    let start = Utc.with_ymd_and_hms(2024, 12, 6, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 12, 7, 0, 0, 0).unwrap();
    let events = tracker
        .day_events("aw-watcher-window_host", start, end)
        .await
        .unwrap();
    assert_eq!(events.len(), 2);

    let body = seen.query_body.lock().unwrap().clone().unwrap();
    assert_eq!(
        body["timeperiods"],
        json!(["2024-12-06T00:00:00.000000+00:00/2024-12-07T00:00:00.000000+00:00"])
    );
    assert_eq!(
        body["query"][0],
        "events = flood(query_bucket(\"aw-watcher-window_host\"));"
    );
    assert_eq!(body["query"][1], "RETURN = events;");
}

#[tokio::test]
async fn error_status_is_remote() {
    let router = Router::new().route(
        "/api/0/buckets/",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(router).await;

    let err = client(&base).buckets().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert!(matches!(err, ContextError::Remote { status: 500, .. }));
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let router = Router::new().route(
        "/api/0/buckets/",
        get(|| async { Json(json!(["not", "a", "map"])) }),
    );
    let base = serve(router).await;

    let err = client(&base).buckets().await.unwrap_err();
    assert!(matches!(err, ContextError::Decode { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Remote);
}

#[tokio::test]
async fn slow_tracker_times_out() {
    let router = Router::new().route(
        "/api/0/buckets/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({}))
        }),
    );
    let base = serve(router).await;
    let tracker =
        TrackerClient::new(&base, Duration::from_millis(200), Duration::from_millis(200)).unwrap();

    let err = tracker.buckets().await.unwrap_err();
    assert!(matches!(err, ContextError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}")).buckets().await.unwrap_err();
    assert!(matches!(err, ContextError::Unreachable { .. }), "got {err:?}");
}
