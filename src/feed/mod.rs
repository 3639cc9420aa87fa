// Inbound feed: per-container push channel of JSON snapshots.

mod convert;
mod docker;

pub use docker::DockerFeed;

use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::sync::mpsc;

/// Lifecycle of one subscription, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Connected,
    /// One undecoded snapshot payload.
    Message(String),
    Disconnected,
}

/// A running container a page can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub image: String,
}

pub trait SnapshotFeed: Send + Sync {
    /// Starts delivering events for `container_id`. The subscription ends when the
    /// receiver is dropped.
    fn subscribe(&self, container_id: &str) -> mpsc::Receiver<FeedEvent>;

    fn containers(&self) -> BoxFuture<'_, anyhow::Result<Vec<ContainerSummary>>>;
}
