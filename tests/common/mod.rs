// Shared test helpers: snapshot payloads and an in-memory feed

#![allow(dead_code)]

use dstats::feed::{ContainerSummary, FeedEvent, SnapshotFeed};
use futures_util::future::BoxFuture;
use serde_json::json;
use tokio::sync::mpsc;

/// Payload with CPU and memory only.
pub fn snapshot_json(observed_at: i64, total_usage: u64, memory_usage: u64) -> String {
    json!({
        "id": "abc123",
        "name": "web",
        "observedAt": observed_at,
        "cpu": { "totalUsage": total_usage },
        "memory": { "usage": memory_usage, "limit": 1024 },
    })
    .to_string()
}

/// Payload with per-core counters.
pub fn per_core_json(observed_at: i64, total_usage: u64, per_core: &[u64]) -> String {
    json!({
        "observedAt": observed_at,
        "cpu": { "totalUsage": total_usage, "perCoreUsage": per_core },
    })
    .to_string()
}

/// Payload with every section populated.
pub fn full_json(observed_at: i64, counter: u64) -> String {
    json!({
        "id": "abc123",
        "name": "web",
        "observedAt": observed_at,
        "cpu": { "totalUsage": counter, "perCoreUsage": [counter / 2, counter / 2], "usagePercent": 12.5 },
        "memory": { "usage": 256 * 1024 * 1024_u64, "limit": 1024 * 1024 * 1024_u64 },
        "network": { "rxBytes": counter, "txBytes": counter * 2 },
        "blockIo": { "readBytes": counter * 3, "writeBytes": counter * 4 },
    })
    .to_string()
}

/// Replays a fixed list of events to every subscriber, then holds the channel open until the
/// subscriber leaves (or closes it right away when `close_after` is set).
pub struct ScriptedFeed {
    pub events: Vec<FeedEvent>,
    pub close_after: bool,
    pub containers: Result<Vec<ContainerSummary>, String>,
}

impl ScriptedFeed {
    pub fn new(events: Vec<FeedEvent>) -> Self {
        Self {
            events,
            close_after: false,
            containers: Ok(vec![]),
        }
    }
}

impl SnapshotFeed for ScriptedFeed {
    fn subscribe(&self, _container_id: &str) -> mpsc::Receiver<FeedEvent> {
        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        let events = self.events.clone();
        let close_after = self.close_after;
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            if !close_after {
                tx.closed().await;
            }
        });
        rx
    }

    fn containers(&self) -> BoxFuture<'_, anyhow::Result<Vec<ContainerSummary>>> {
        let result = self.containers.clone().map_err(anyhow::Error::msg);
        Box::pin(async move { result })
    }
}
