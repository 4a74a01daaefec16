//! Funnel step assembly: conversion and drop-off rates over ordered stage
//! counts.
//!
//! Both rates are always stage-over-previous-stage, never stage-over-top.
//! Cohorts are independently filtered sets, so `count[i] <= count[i-1]` is
//! not enforced anywhere.

use serde::{Deserialize, Serialize};

/// One stage of a computed funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStepReport {
    pub name: String,
    pub count: u64,
    /// Percentage of the previous stage's cohort that reached this stage.
    /// Defined as 100 for the top-of-funnel stage.
    pub conversion_rate: f64,
    /// `100 - conversion_rate` relative to the immediately preceding stage;
    /// 0 for the top-of-funnel stage.
    pub drop_off: f64,
    /// Median time to the next stage, in the funnel's reporting unit. Only
    /// present between consecutive instrumented stages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_time_to_next: Option<f64>,
}

/// Percentage of `count` over `base`; defined as 0 when `base` is 0 so that
/// empty windows never divide by zero.
pub fn rate_over(count: u64, base: u64) -> f64 {
    if base == 0 {
        0.0
    } else {
        count as f64 / base as f64 * 100.0
    }
}

/// Build step reports from ordered `(name, count)` pairs.
pub fn build_steps(counts: &[(&str, u64)]) -> Vec<FunnelStepReport> {
    counts
        .iter()
        .enumerate()
        .map(|(i, (name, count))| {
            let conversion_rate = if i == 0 {
                100.0
            } else {
                rate_over(*count, counts[i - 1].1)
            };
            let drop_off = if i == 0 { 0.0 } else { 100.0 - conversion_rate };
            FunnelStepReport {
                name: name.to_string(),
                count: *count,
                conversion_rate,
                drop_off,
                median_time_to_next: None,
            }
        })
        .collect()
}
