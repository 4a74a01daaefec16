//! Stuck-actor detection: actors that entered a stage but never reached the
//! next one within the staleness window.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An actor flagged as stuck on a funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuckActor {
    pub user_id: String,
    pub current_step: String,
    pub days_since_step: i64,
}

/// Detailed stuck-user row returned by the ad-hoc stuck-user query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuckUserDetail {
    pub user_id: String,
    pub stuck_at: String,
    pub days_since_step: i64,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Actors present in `entered` but absent from `reached`, whose earliest
/// stage timestamp is older than `now - staleness`.
///
/// The result is truncated to `cap` entries with no sort beforehand; callers
/// get an arbitrary subset of the stuck set, not the worst offenders.
pub fn detect_stuck(
    entered: &HashMap<String, DateTime<Utc>>,
    reached: &HashSet<String>,
    stage_name: &str,
    staleness: Duration,
    cap: usize,
    now: DateTime<Utc>,
) -> Vec<StuckActor> {
    let cutoff = now - staleness;
    entered
        .iter()
        .filter(|(actor, _)| !reached.contains(*actor))
        .filter(|(_, ts)| **ts < cutoff)
        .map(|(actor, ts)| StuckActor {
            user_id: actor.clone(),
            current_step: stage_name.to_string(),
            days_since_step: (now - *ts).num_days(),
        })
        .take(cap)
        .collect()
}
