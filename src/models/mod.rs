// Wire models: inbound snapshots and outbound derived series

mod series;
mod snapshot;

pub use series::{
    Axes, CoreRatePoint, DegradedReason, DegradedSample, DerivedSeries, Gauges, Metric, Point,
    RatePoint, Summary,
};
pub use snapshot::{BlockIoCounters, CpuCounters, MemoryUsage, NetworkCounters, Snapshot};
