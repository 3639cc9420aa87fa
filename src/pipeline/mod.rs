// Snapshot ingest: decode at the boundary, push into the window, re-derive.
// One pipeline per subscription; each event is handled to completion before the next.

pub mod derive;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::feed::FeedEvent;
use crate::models::{DerivedSeries, Snapshot};
use crate::rate::TimeUnit;
use crate::window::Window;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    Invalid(String),
}

/// Parse and validate one inbound payload.
pub fn decode(raw: &str) -> Result<Snapshot, DecodeError> {
    let snapshot: Snapshot = serde_json::from_str(raw)?;
    if snapshot.observed_at < 0 {
        return Err(DecodeError::Invalid(format!(
            "observedAt must be non-negative, got {}",
            snapshot.observed_at
        )));
    }
    let percents = [
        ("cpu.usagePercent", snapshot.cpu.usage_percent),
        (
            "memory.usagePercent",
            snapshot.memory.as_ref().and_then(|m| m.usage_percent),
        ),
    ];
    for (field, value) in percents {
        if let Some(v) = value
            && v < 0.0
        {
            return Err(DecodeError::Invalid(format!(
                "{field} must be non-negative, got {v}"
            )));
        }
    }
    Ok(snapshot)
}

/// Message handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Update {
    Status { connected: bool },
    Series(DerivedSeries),
}

pub struct Pipeline {
    window: Window<Snapshot>,
    rate_unit: TimeUnit,
    connected: bool,
    ingested: u64,
    dropped: u64,
}

impl Pipeline {
    pub fn new(window_capacity: usize, rate_unit: TimeUnit) -> Self {
        Self {
            window: Window::new(window_capacity),
            rate_unit,
            connected: false,
            ingested: 0,
            dropped: 0,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.window_capacity, config.rate_unit)
    }

    /// Feed connected: begin from an empty window.
    pub fn start(&mut self) {
        self.window.clear();
        self.connected = true;
    }

    /// Feed gone: drop the window. A later `start` never resumes it.
    pub fn stop(&mut self) {
        self.window.clear();
        self.connected = false;
    }

    /// Decodes `raw`, appends it and returns the fresh derivation. A decode error leaves the
    /// window untouched.
    pub fn on_message(&mut self, raw: &str) -> Result<DerivedSeries, DecodeError> {
        let snapshot = match decode(raw) {
            Ok(s) => s,
            Err(e) => {
                self.dropped += 1;
                return Err(e);
            }
        };
        self.window.push(snapshot);
        self.ingested += 1;
        Ok(self.derive())
    }

    pub fn derive(&self) -> DerivedSeries {
        derive::derive(&self.window, self.rate_unit)
    }

    /// Runs one feed event through the pipeline. Malformed messages are logged and yield
    /// nothing for the renderer.
    pub fn handle(&mut self, event: FeedEvent) -> Option<Update> {
        match event {
            FeedEvent::Connected => {
                info!(operation = "feed_connected", "window reset");
                self.start();
                Some(Update::Status { connected: true })
            }
            FeedEvent::Message(raw) => match self.on_message(&raw) {
                Ok(series) => {
                    debug!(
                        window_len = self.window.len(),
                        degraded = series.degraded.len(),
                        "snapshot ingested"
                    );
                    Some(Update::Series(series))
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        operation = "decode_snapshot",
                        dropped_total = self.dropped,
                        "dropping malformed snapshot"
                    );
                    None
                }
            },
            FeedEvent::Disconnected => {
                info!(
                    operation = "feed_disconnected",
                    ingested_total = self.ingested,
                    dropped_total = self.dropped,
                    "window cleared"
                );
                self.stop();
                Some(Update::Status { connected: false })
            }
        }
    }

    pub fn window(&self) -> &Window<Snapshot> {
        &self.window
    }

    pub fn rate_unit(&self) -> TimeUnit {
        self.rate_unit
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
