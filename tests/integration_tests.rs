// Integration tests: HTTP and WebSocket endpoints against a scripted feed

mod common;

use axum_test::TestServer;
use common::{ScriptedFeed, snapshot_json};
use dstats::config::AppConfig;
use dstats::feed::{ContainerSummary, FeedEvent};
use dstats::routes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const TEST_CONFIG: &str = r#"
[server]
port = 9090
host = "0.0.0.0"

[pipeline]
window_capacity = 2
"#;

fn test_app(feed: ScriptedFeed) -> axum::Router {
    test_app_with_counter(feed, Arc::new(AtomicUsize::new(0)))
}

fn test_app_with_counter(feed: ScriptedFeed, ws_connections: Arc<AtomicUsize>) -> axum::Router {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    routes::app(Arc::new(feed), ws_connections, config)
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http(feed: ScriptedFeed) -> TestServer {
    TestServer::builder()
        .http_transport()
        .try_build(test_app(feed))
        .unwrap()
}

async fn receive_json(ws: &mut axum_test::TestWebSocket) -> serde_json::Value {
    let text = tokio::time::timeout(tokio::time::Duration::from_secs(3), ws.receive_text())
        .await
        .expect("timed out waiting for JSON");
    serde_json::from_str(&text).expect("valid JSON")
}

#[tokio::test]
async fn test_root_endpoint() {
    let server = TestServer::try_new(test_app(ScriptedFeed::new(vec![]))).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("dstats: container metrics dashboard");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = TestServer::try_new(test_app(ScriptedFeed::new(vec![]))).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("dstats"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_containers_endpoint_lists_feed_containers() {
    let mut feed = ScriptedFeed::new(vec![]);
    feed.containers = Ok(vec![ContainerSummary {
        id: "abc123".into(),
        name: "web".into(),
        image: "nginx:latest".into(),
    }]);
    let server = TestServer::try_new(test_app(feed)).unwrap();
    let response = server.get("/api/containers").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json,
        serde_json::json!([{ "id": "abc123", "name": "web", "image": "nginx:latest" }])
    );
}

#[tokio::test]
async fn test_containers_endpoint_reports_feed_errors() {
    let mut feed = ScriptedFeed::new(vec![]);
    feed.containers = Err("docker unavailable".into());
    let server = TestServer::try_new(test_app(feed)).unwrap();
    let response = server.get("/api/containers").await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = response.json();
    assert_eq!(json["error"], "docker unavailable");
}

#[tokio::test]
async fn test_ws_container_streams_derived_series() {
    let feed = ScriptedFeed::new(vec![
        FeedEvent::Connected,
        FeedEvent::Message(snapshot_json(0, 0, 100)),
        FeedEvent::Message("{\"broken\": true}".into()),
        FeedEvent::Message(snapshot_json(1, 500_000, 200)),
        FeedEvent::Message(snapshot_json(2, 1_200_000, 300)),
        FeedEvent::Disconnected,
    ]);
    let server = test_server_with_http(feed);
    let mut ws = server
        .get_websocket("/ws/containers/abc123")
        .await
        .into_websocket()
        .await;

    let status = receive_json(&mut ws).await;
    assert_eq!(status, serde_json::json!({ "type": "status", "connected": true }));

    let first = receive_json(&mut ws).await;
    assert_eq!(first["type"], "series");
    assert_eq!(first["memoryUsage"].as_array().unwrap().len(), 1);
    assert!(first["cpuTotalRate"].as_array().unwrap().is_empty());

    // malformed payload produced nothing; next message is the second snapshot
    let second = receive_json(&mut ws).await;
    assert_eq!(second["memoryUsage"].as_array().unwrap().len(), 2);
    assert_eq!(second["cpuTotalRate"][0]["value"], 0.5);

    // window capacity 2: the first snapshot has been evicted
    let third = receive_json(&mut ws).await;
    let memory: Vec<f64> = third["memoryUsage"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_f64().unwrap())
        .collect();
    assert_eq!(memory, vec![200.0, 300.0]);
    assert_eq!(third["cpuTotalRate"].as_array().unwrap().len(), 1);
    assert_eq!(third["cpuTotalRate"][0]["value"], 0.7);

    let status = receive_json(&mut ws).await;
    assert_eq!(status, serde_json::json!({ "type": "status", "connected": false }));
}

#[tokio::test]
async fn test_ws_reconnect_starts_fresh_window() {
    let feed = ScriptedFeed::new(vec![
        FeedEvent::Connected,
        FeedEvent::Message(snapshot_json(0, 0, 100)),
        FeedEvent::Disconnected,
        FeedEvent::Connected,
        FeedEvent::Message(snapshot_json(10, 0, 999)),
    ]);
    let server = test_server_with_http(feed);
    let mut ws = server
        .get_websocket("/ws/containers/abc123")
        .await
        .into_websocket()
        .await;

    for _ in 0..4 {
        receive_json(&mut ws).await;
    }
    let series = receive_json(&mut ws).await;
    assert_eq!(series["type"], "series");
    assert_eq!(
        series["memoryUsage"],
        serde_json::json!([{ "timestamp": 10, "value": 999.0 }])
    );
}

#[tokio::test]
async fn test_ws_connection_count_tracks_open_sockets() {
    let ws_connections = Arc::new(AtomicUsize::new(0));
    let feed = ScriptedFeed::new(vec![FeedEvent::Connected]);
    let server = TestServer::builder()
        .http_transport()
        .try_build(test_app_with_counter(feed, ws_connections.clone()))
        .unwrap();
    let mut ws = server
        .get_websocket("/ws/containers/abc123")
        .await
        .into_websocket()
        .await;

    let status = receive_json(&mut ws).await;
    assert_eq!(status["connected"], true);
    assert_eq!(ws_connections.load(Ordering::Relaxed), 1);

    ws.close().await;
    tokio::time::timeout(tokio::time::Duration::from_secs(3), async {
        while ws_connections.load(Ordering::Relaxed) != 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("connection count should return to 0 after close");
}
