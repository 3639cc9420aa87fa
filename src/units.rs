// Human-scaled byte magnitudes (B..YB, base 1024) for labels and axis ticks.
// Display only: the numeric series are never rewritten.

use serde::Serialize;
use std::fmt;

pub const SUFFIXES: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

const STEP: f64 = 1024.0;

/// A value scaled into the largest unit that keeps it >= 1, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scaled {
    pub value: f64,
    pub suffix: &'static str,
}

impl fmt::Display for Scaled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.suffix)
    }
}

/// Scale a byte count. `scale(0.0)` is `0 B`; negative or non-finite input is returned
/// unscaled in bytes.
pub fn scale(value: f64) -> Scaled {
    if !value.is_finite() || value <= 0.0 {
        let value = if value.is_finite() { round2(value) } else { 0.0 };
        return Scaled {
            value,
            suffix: SUFFIXES[0],
        };
    }
    let last = SUFFIXES.len() - 1;
    let mut index = (value.ln() / STEP.ln()).floor().clamp(0.0, last as f64) as usize;
    // ln ratio can land a hair off an exact power of 1024
    if index < last && value / STEP.powi(index as i32 + 1) >= 1.0 {
        index += 1;
    } else if index > 0 && value / STEP.powi(index as i32) < 1.0 {
        index -= 1;
    }
    Scaled {
        value: round2(value / STEP.powi(index as i32)),
        suffix: SUFFIXES[index],
    }
}

/// `scale` for integer byte counters.
pub fn format_bytes(bytes: u64) -> String {
    scale(bytes as f64).to_string()
}

/// `"<a> / <b>"` label, e.g. memory usage over limit or rx over tx. Absent sides render as `-`.
pub fn pair_label(a: Option<u64>, b: Option<u64>) -> String {
    let side = |v: Option<u64>| v.map_or_else(|| "-".to_string(), format_bytes);
    format!("{} / {}", side(a), side(b))
}

/// One axis tick: the raw position and its display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// `count` evenly spaced ticks from 0 to `max` inclusive. Fewer than two ticks, or a
/// non-positive max, collapses to a single `0 B` tick.
pub fn axis_ticks(max: f64, count: usize) -> Vec<Tick> {
    if count < 2 || !max.is_finite() || max <= 0.0 {
        return vec![Tick {
            value: 0.0,
            label: scale(0.0).to_string(),
        }];
    }
    let step = max / (count - 1) as f64;
    (0..count)
        .map(|i| {
            let value = step * i as f64;
            Tick {
                value,
                label: scale(value).to_string(),
            }
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_zero_is_bytes() {
        assert_eq!(
            scale(0.0),
            Scaled {
                value: 0.0,
                suffix: "B"
            }
        );
    }

    #[test]
    fn scale_picks_largest_unit_above_one() {
        assert_eq!(scale(1024.0).suffix, "KB");
        assert_eq!(scale(1024.0).value, 1.0);
        assert_eq!(scale(1536.0).value, 1.5);
        assert_eq!(scale(1023.0).suffix, "B");
        assert_eq!(scale(1024.0 * 1024.0).suffix, "MB");
        assert_eq!(scale(5.0 * 1024.0 * 1024.0 * 1024.0).suffix, "GB");
    }

    #[test]
    fn scale_rounds_to_two_decimals() {
        let s = scale(1000.0 * 1024.0 + 123.0);
        assert_eq!(s.suffix, "KB");
        assert_eq!(s.value, 1000.12);
    }

    #[test]
    fn scale_clamps_to_yottabytes() {
        let s = scale(STEP.powi(9));
        assert_eq!(s.suffix, "YB");
        assert_eq!(s.value, 1024.0);
    }

    #[test]
    fn scale_negative_and_nan_do_not_panic() {
        assert_eq!(scale(-5.0).suffix, "B");
        assert_eq!(scale(-5.0).value, -5.0);
        assert_eq!(scale(f64::NAN).value, 0.0);
    }

    #[test]
    fn display_and_labels() {
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(
            pair_label(Some(256 * 1024 * 1024), Some(1024 * 1024 * 1024)),
            "256 MB / 1 GB"
        );
        assert_eq!(pair_label(Some(10), None), "10 B / -");
    }

    #[test]
    fn axis_ticks_are_evenly_spaced() {
        let ticks = axis_ticks(2048.0, 3);
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].label, "0 B");
        assert_eq!(ticks[1].label, "1 KB");
        assert_eq!(ticks[2].label, "2 KB");
        assert_eq!(axis_ticks(0.0, 5).len(), 1);
    }
}
