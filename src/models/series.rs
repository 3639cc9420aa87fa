// Outbound derived series: a pure projection of the current window, ready for plotting.

use serde::Serialize;

use crate::rate::TimeUnit;
use crate::units::Tick;

/// Raw magnitude at one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub timestamp: i64,
    pub value: f64,
}

/// Rate between a snapshot and its predecessor, stamped with the later timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    pub timestamp: i64,
    pub value: f64,
    pub reset: bool,
}

/// Per-core rates for one consecutive pair; `reset` if any core's counter went backwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreRatePoint {
    pub timestamp: i64,
    pub values: Vec<f64>,
    pub reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    CpuTotal,
    CpuPerCore,
    NetworkRx,
    NetworkTx,
    BlockRead,
    BlockWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DegradedReason {
    CounterReset,
    NonIncreasingInterval,
    CoreCountMismatch,
}

/// A rate sample that was flagged or omitted instead of computed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedSample {
    pub timestamp: i64,
    pub metric: Metric,
    pub reason: DegradedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gauges {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
}

/// Display strings for the latest snapshot (the stats table row).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub container_id: String,
    pub name: String,
    pub cpu_percent: String,
    pub memory_usage_limit: String,
    pub memory_percent: String,
    pub net_io: String,
    pub block_io: String,
}

/// Axis ticks for the byte-valued raw series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axes {
    pub memory: Vec<Tick>,
    pub network: Vec<Tick>,
    pub block_io: Vec<Tick>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSeries {
    pub rate_unit: TimeUnit,
    pub memory_usage: Vec<Point>,
    pub memory_limit: Vec<Point>,
    pub network_rx: Vec<Point>,
    pub network_tx: Vec<Point>,
    pub block_read: Vec<Point>,
    pub block_write: Vec<Point>,
    pub cpu_total_rate: Vec<RatePoint>,
    pub cpu_per_core_rate: Vec<CoreRatePoint>,
    pub network_rx_rate: Vec<RatePoint>,
    pub network_tx_rate: Vec<RatePoint>,
    pub block_read_rate: Vec<RatePoint>,
    pub block_write_rate: Vec<RatePoint>,
    pub gauges: Gauges,
    pub summary: Option<Summary>,
    pub axes: Axes,
    pub degraded: Vec<DegradedSample>,
}
