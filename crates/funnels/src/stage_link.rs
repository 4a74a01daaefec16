//! Stage linking: per-actor durations between consecutive funnel stages and
//! the summary statistics reported on them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const HOUR_MS: f64 = 3_600_000.0;
const DAY_MS: f64 = 86_400_000.0;

/// Unit funnel durations are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    /// Learner funnel durations.
    Hours,
    /// Creator funnel durations.
    Days,
}

impl DurationUnit {
    fn divisor(self) -> f64 {
        match self {
            DurationUnit::Hours => HOUR_MS,
            DurationUnit::Days => DAY_MS,
        }
    }
}

/// Median and arithmetic mean of a stage-to-stage duration set, in the
/// funnel's reporting unit, rounded to one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub median: f64,
    pub average: f64,
}

impl DurationStats {
    pub fn zero() -> Self {
        Self {
            median: 0.0,
            average: 0.0,
        }
    }
}

/// Per-actor durations in milliseconds between an earlier and a later stage.
///
/// Only actors present in both maps contribute. Non-positive durations are
/// invalid data points (clock skew, out-of-order ingestion) and are excluded
/// rather than surfaced.
pub fn link_stages(
    earlier: &HashMap<String, DateTime<Utc>>,
    later: &HashMap<String, DateTime<Utc>>,
) -> Vec<i64> {
    later
        .iter()
        .filter_map(|(actor, later_ts)| {
            earlier
                .get(actor)
                .map(|earlier_ts| (*later_ts - *earlier_ts).num_milliseconds())
        })
        .filter(|d| *d > 0)
        .collect()
}

/// Median of a millisecond duration set. Empty input is 0; even-length input
/// averages the two middle elements.
pub fn median_ms(durations: &[i64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    let mut sorted = durations.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Arithmetic mean of a millisecond duration set; 0 when empty.
pub fn average_ms(durations: &[i64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<i64>() as f64 / durations.len() as f64
}

/// Summarize a duration set in the given unit.
pub fn stats(durations: &[i64], unit: DurationUnit) -> DurationStats {
    DurationStats {
        median: round1(median_ms(durations) / unit.divisor()),
        average: round1(average_ms(durations) / unit.divisor()),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
