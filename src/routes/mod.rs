// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::feed::SnapshotFeed;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) feed: Arc<dyn SnapshotFeed>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app(
    feed: Arc<dyn SnapshotFeed>,
    ws_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        feed,
        ws_connections,
        config,
    };
    Router::new()
        .route("/", get(|| async { "dstats: container metrics dashboard" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/containers", get(http::containers_handler)) // GET /api/containers
        .route("/ws/containers/{id}", get(ws::ws_container)) // WS /ws/containers/{id}
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
