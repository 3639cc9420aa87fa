// Per-time-unit rates from two timestamped readings of a cumulative counter.

use serde::{Deserialize, Serialize};

/// Time unit the interval is normalized to; every rate of a pipeline shares one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
}

impl TimeUnit {
    pub fn per_millisecond(self) -> f64 {
        match self {
            TimeUnit::Nanosecond => 1_000_000.0,
            TimeUnit::Microsecond => 1_000.0,
            TimeUnit::Millisecond => 1.0,
            TimeUnit::Second => 0.001,
        }
    }
}

/// One reading of a cumulative counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub observed_at_ms: i64,
    pub counter: u64,
}

/// A computed rate. `reset` marks a counter that went backwards; its value is clamped to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rate {
    pub value: f64,
    pub reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("non-increasing interval: {prev_ms}ms -> {cur_ms}ms")]
    NonIncreasingInterval { prev_ms: i64, cur_ms: i64 },
    #[error("core count changed from {prev} to {cur}")]
    CoreCountMismatch { prev: usize, cur: usize },
}

/// Interval between two observations in `unit`. Errors unless `cur_ms > prev_ms`.
pub fn interval(prev_ms: i64, cur_ms: i64, unit: TimeUnit) -> Result<f64, RateError> {
    if cur_ms <= prev_ms {
        return Err(RateError::NonIncreasingInterval { prev_ms, cur_ms });
    }
    Ok((cur_ms - prev_ms) as f64 * unit.per_millisecond())
}

/// Counter delta over a known interval.
pub fn rate_over(prev: u64, cur: u64, interval: f64) -> Rate {
    match cur.checked_sub(prev) {
        Some(delta) => Rate {
            value: delta as f64 / interval,
            reset: false,
        },
        None => Rate {
            value: 0.0,
            reset: true,
        },
    }
}

pub fn rate(prev: Reading, cur: Reading, unit: TimeUnit) -> Result<Rate, RateError> {
    let interval = interval(prev.observed_at_ms, cur.observed_at_ms, unit)?;
    Ok(rate_over(prev.counter, cur.counter, interval))
}

/// Elementwise `rate` over per-core counters; both sides must have the same core count.
pub fn per_core_rates(
    prev_ms: i64,
    prev: &[u64],
    cur_ms: i64,
    cur: &[u64],
    unit: TimeUnit,
) -> Result<Vec<Rate>, RateError> {
    if prev.len() != cur.len() {
        return Err(RateError::CoreCountMismatch {
            prev: prev.len(),
            cur: cur.len(),
        });
    }
    let interval = interval(prev_ms, cur_ms, unit)?;
    Ok(prev
        .iter()
        .zip(cur)
        .map(|(p, c)| rate_over(*p, *c, interval))
        .collect())
}
