// Docker-backed feed: one stats stream per subscription via bollard, reconnecting on end.

use super::{ContainerSummary, FeedEvent, SnapshotFeed, convert};
use bollard::Docker;
use bollard::query_parameters::{ListContainersOptions, StatsOptions};
use bollard::models::ContainerStatsResponse;
use futures_util::future::BoxFuture;
use futures_util::{Stream, StreamExt};
use std::collections::HashMap;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{Instrument, debug, info, warn};

pub struct DockerFeed {
    docker: Docker,
    channel_capacity: usize,
    reconnect_delay: Duration,
}

impl DockerFeed {
    pub fn connect(channel_capacity: usize, reconnect_delay: Duration) -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self {
            docker,
            channel_capacity,
            reconnect_delay,
        })
    }

    async fn list_running(&self) -> anyhow::Result<Vec<ContainerSummary>> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);

        let filter = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };

        let containers = self.docker.list_containers(Some(filter)).await?;
        Ok(containers
            .into_iter()
            .map(|c| {
                let id = c.id.unwrap_or_default();
                let name = c
                    .names
                    .as_ref()
                    .and_then(|n| n.first())
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_else(|| id.clone());
                ContainerSummary {
                    id,
                    name,
                    image: c.image.unwrap_or_default(),
                }
            })
            .collect())
    }
}

impl SnapshotFeed for DockerFeed {
    fn subscribe(&self, container_id: &str) -> mpsc::Receiver<FeedEvent> {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let span = tracing::debug_span!("feed", container = %container_id);
        let docker = self.docker.clone();
        let stats_id = container_id.to_string();
        let open = move || {
            let options = StatsOptions {
                stream: true,
                ..Default::default()
            };
            docker.stats(&stats_id, Some(options))
        };
        tokio::spawn(
            stream_container(open, container_id.to_string(), self.reconnect_delay, tx)
                .instrument(span),
        );
        rx
    }

    fn containers(&self) -> BoxFuture<'_, anyhow::Result<Vec<ContainerSummary>>> {
        Box::pin(self.list_running())
    }
}

/// Pumps stats for one container into `tx` until the receiver goes away. `open` starts a
/// fresh stats stream on every (re)connect.
/// `Connected` is sent on the first item of each stream; `Disconnected` only after a stream
/// that delivered one.
async fn stream_container<F, S, E>(
    mut open: F,
    id: String,
    reconnect_delay: Duration,
    tx: mpsc::Sender<FeedEvent>,
) where
    F: FnMut() -> S,
    S: Stream<Item = Result<ContainerStatsResponse, E>>,
    E: Display,
{
    loop {
        let mut stream = std::pin::pin!(open());
        let mut connected = false;

        while let Some(result) = stream.next().await {
            let stats = match result {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, operation = "docker_stats", "stats stream error");
                    break;
                }
            };
            if !connected {
                info!("feed connected");
                if tx.send(FeedEvent::Connected).await.is_err() {
                    return;
                }
                connected = true;
            }
            let observed_at = chrono::Utc::now().timestamp_millis();
            let Some(snapshot) = convert::to_snapshot(&stats, &id, observed_at) else {
                debug!("stats response without cpu counters; skipped");
                continue;
            };
            let payload = match serde_json::to_string(&snapshot) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, operation = "encode_snapshot", "snapshot encode failed");
                    continue;
                }
            };
            if tx.send(FeedEvent::Message(payload)).await.is_err() {
                debug!("subscriber gone");
                return;
            }
        }

        if connected {
            info!("feed disconnected");
            if tx.send(FeedEvent::Disconnected).await.is_err() {
                return;
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay) => {}
            _ = tx.closed() => return,
        }
    }
}
