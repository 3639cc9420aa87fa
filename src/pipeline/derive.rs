// Series derivation: recomputed from the whole window on every call, never accumulated.

use crate::models::{
    Axes, CoreRatePoint, DegradedReason, DegradedSample, DerivedSeries, Gauges, Metric, Point,
    RatePoint, Snapshot, Summary,
};
use crate::rate::{self, RateError, TimeUnit};
use crate::units;
use crate::window::Window;

/// Ticks per byte axis.
pub const AXIS_TICKS: usize = 5;

pub fn derive(window: &Window<Snapshot>, unit: TimeUnit) -> DerivedSeries {
    let gauges = gauges(window.latest());
    let summary = window.latest().map(|s| summary(s, &gauges));
    let mut out = DerivedSeries {
        rate_unit: unit,
        memory_usage: Vec::with_capacity(window.len()),
        memory_limit: Vec::with_capacity(window.len()),
        network_rx: Vec::with_capacity(window.len()),
        network_tx: Vec::with_capacity(window.len()),
        block_read: Vec::with_capacity(window.len()),
        block_write: Vec::with_capacity(window.len()),
        cpu_total_rate: Vec::new(),
        cpu_per_core_rate: Vec::new(),
        network_rx_rate: Vec::new(),
        network_tx_rate: Vec::new(),
        block_read_rate: Vec::new(),
        block_write_rate: Vec::new(),
        gauges,
        summary,
        axes: Axes::default(),
        degraded: Vec::new(),
    };

    for s in window.iter() {
        let ts = s.observed_at;
        push_point(&mut out.memory_usage, ts, s.memory_usage());
        push_point(&mut out.memory_limit, ts, s.memory_limit());
        push_point(&mut out.network_rx, ts, s.network_rx());
        push_point(&mut out.network_tx, ts, s.network_tx());
        push_point(&mut out.block_read, ts, s.block_read());
        push_point(&mut out.block_write, ts, s.block_write());
    }

    for (prev, cur) in window.pairs() {
        derive_pair(prev, cur, unit, &mut out);
    }

    out.axes = Axes {
        memory: ticks(&[&out.memory_usage, &out.memory_limit]),
        network: ticks(&[&out.network_rx, &out.network_tx]),
        block_io: ticks(&[&out.block_read, &out.block_write]),
    };
    out
}

fn derive_pair(prev: &Snapshot, cur: &Snapshot, unit: TimeUnit, out: &mut DerivedSeries) {
    let ts = cur.observed_at;
    let interval = rate::interval(prev.observed_at, cur.observed_at, unit);

    push_rate(
        &mut out.cpu_total_rate,
        &mut out.degraded,
        Metric::CpuTotal,
        ts,
        interval,
        Some(prev.cpu.total_usage),
        Some(cur.cpu.total_usage),
    );

    let (prev_cores, cur_cores) = (&prev.cpu.per_core_usage, &cur.cpu.per_core_usage);
    if !prev_cores.is_empty() || !cur_cores.is_empty() {
        match rate::per_core_rates(prev.observed_at, prev_cores, cur.observed_at, cur_cores, unit)
        {
            Ok(rates) => {
                let reset = rates.iter().any(|r| r.reset);
                if reset {
                    out.degraded
                        .push(degraded(ts, Metric::CpuPerCore, DegradedReason::CounterReset));
                }
                out.cpu_per_core_rate.push(CoreRatePoint {
                    timestamp: ts,
                    values: rates.iter().map(|r| r.value).collect(),
                    reset,
                });
            }
            Err(e) => out.degraded.push(degraded(ts, Metric::CpuPerCore, reason(e))),
        }
    }

    push_rate(
        &mut out.network_rx_rate,
        &mut out.degraded,
        Metric::NetworkRx,
        ts,
        interval,
        prev.network_rx(),
        cur.network_rx(),
    );
    push_rate(
        &mut out.network_tx_rate,
        &mut out.degraded,
        Metric::NetworkTx,
        ts,
        interval,
        prev.network_tx(),
        cur.network_tx(),
    );
    push_rate(
        &mut out.block_read_rate,
        &mut out.degraded,
        Metric::BlockRead,
        ts,
        interval,
        prev.block_read(),
        cur.block_read(),
    );
    push_rate(
        &mut out.block_write_rate,
        &mut out.degraded,
        Metric::BlockWrite,
        ts,
        interval,
        prev.block_write(),
        cur.block_write(),
    );
}

/// Adds one rate point when both readings exist. A bad interval omits the point; a
/// counter reset keeps it at 0 with the flag set. Both are recorded as degraded.
fn push_rate(
    series: &mut Vec<RatePoint>,
    degraded_out: &mut Vec<DegradedSample>,
    metric: Metric,
    ts: i64,
    interval: Result<f64, RateError>,
    prev: Option<u64>,
    cur: Option<u64>,
) {
    let (Some(prev), Some(cur)) = (prev, cur) else {
        return;
    };
    let interval = match interval {
        Ok(i) => i,
        Err(e) => {
            degraded_out.push(degraded(ts, metric, reason(e)));
            return;
        }
    };
    let r = rate::rate_over(prev, cur, interval);
    if r.reset {
        degraded_out.push(degraded(ts, metric, DegradedReason::CounterReset));
    }
    series.push(RatePoint {
        timestamp: ts,
        value: r.value,
        reset: r.reset,
    });
}

fn push_point(series: &mut Vec<Point>, timestamp: i64, value: Option<u64>) {
    if let Some(v) = value {
        series.push(Point {
            timestamp,
            value: v as f64,
        });
    }
}

fn degraded(timestamp: i64, metric: Metric, reason: DegradedReason) -> DegradedSample {
    DegradedSample {
        timestamp,
        metric,
        reason,
    }
}

fn reason(e: RateError) -> DegradedReason {
    match e {
        RateError::NonIncreasingInterval { .. } => DegradedReason::NonIncreasingInterval,
        RateError::CoreCountMismatch { .. } => DegradedReason::CoreCountMismatch,
    }
}

fn gauges(latest: Option<&Snapshot>) -> Gauges {
    match latest {
        Some(s) => Gauges {
            cpu_percent: s.cpu.usage_percent,
            memory_percent: s.memory.as_ref().and_then(|m| m.percent()),
        },
        None => Gauges::default(),
    }
}

fn summary(s: &Snapshot, gauges: &Gauges) -> Summary {
    Summary {
        container_id: s.id.clone(),
        name: s.name.clone(),
        cpu_percent: percent_label(gauges.cpu_percent),
        memory_usage_limit: units::pair_label(s.memory_usage(), s.memory_limit()),
        memory_percent: percent_label(gauges.memory_percent),
        net_io: units::pair_label(s.network_rx(), s.network_tx()),
        block_io: units::pair_label(s.block_read(), s.block_write()),
    }
}

fn percent_label(p: Option<f64>) -> String {
    p.map_or_else(|| "-".to_string(), |p| format!("{:.2}%", p))
}

fn ticks(series: &[&Vec<Point>]) -> Vec<units::Tick> {
    let max = series
        .iter()
        .flat_map(|s| s.iter().map(|p| p.value))
        .fold(0.0, f64::max);
    units::axis_ticks(max, AXIS_TICKS)
}
