// WebSocket handler: one feed subscription and one pipeline per connected client.

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, timeout};

use super::AppState;
use crate::feed::FeedEvent;
use crate::pipeline::Pipeline;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the connection count on drop (connect = +1, drop = -1).
struct WsConnectionGuard(Arc<AtomicUsize>);

impl Drop for WsConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

pub(super) async fn ws_container(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let feed = state.feed.clone();
    let conn_count = state.ws_connections.clone();
    let pipeline = Pipeline::from_config(&state.config.pipeline);
    ws.on_upgrade(move |socket| async move {
        let events = feed.subscribe(&id);
        if let Err(e) = stream_container(socket, events, pipeline, conn_count, &id).await {
            tracing::info!(container = %id, "Container stream error: {}", e);
        }
    })
}

async fn stream_container(
    mut socket: WebSocket,
    mut events: mpsc::Receiver<FeedEvent>,
    mut pipeline: Pipeline,
    conn_count: Arc<AtomicUsize>,
    id: &str,
) -> anyhow::Result<()> {
    let clients = conn_count.fetch_add(1, Ordering::Relaxed) + 1;
    let _guard = WsConnectionGuard(conn_count.clone());
    tracing::info!(
        container = %id,
        clients,
        window_capacity = pipeline.window().capacity(),
        "Client connected to container stream"
    );

    let mut ping_interval =
        tokio::time::interval_at(Instant::now() + WS_PING_INTERVAL, WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::debug!(container = %id, "feed closed");
                    break;
                };
                let Some(update) = pipeline.handle(event) else {
                    continue;
                };
                let json = serde_json::to_string(&update)?;
                if !send(&mut socket, Message::Text(json.into())).await {
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            _ = ping_interval.tick() => {
                if !send(&mut socket, Message::Ping(Bytes::new())).await {
                    break;
                }
            }
        }
    }
    pipeline.stop();
    tracing::info!(
        container = %id,
        // the guard has not dropped yet
        clients = conn_count.load(Ordering::Relaxed).saturating_sub(1),
        ingested_total = pipeline.ingested(),
        dropped_total = pipeline.dropped(),
        "Client disconnected from container stream"
    );
    Ok(())
}

/// False when the send failed or timed out; the session should end.
async fn send(socket: &mut WebSocket, msg: Message) -> bool {
    matches!(timeout(WS_SEND_TIMEOUT, socket.send(msg)).await, Ok(Ok(())))
}
