//! Funnel query surface: learner funnel, creator funnel, and the ad-hoc
//! stuck-user query.
//!
//! All three operations are pure reads over the event log. Nothing is
//! persisted; every cohort, timestamp map, and report is recomputed per
//! invocation, so identical inputs over an unchanged log yield identical
//! output.

use std::cmp;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use creatorhub_core::config::FunnelConfig;
use creatorhub_core::types::{EventType, FunnelKind};
use creatorhub_core::{HubError, HubResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculator::{build_steps, rate_over, FunnelStepReport};
use crate::cohort::{
    earliest_by_actor, earliest_by_actor_for_resources, unique_actors, unique_actors_for_resources,
};
use crate::event_log::EventLog;
use crate::stage_link::{link_stages, stats, DurationStats, DurationUnit};
use crate::stuck::{detect_stuck, StuckActor, StuckUserDetail};

/// Learner funnel stage names, top of funnel first.
pub const LEARNER_STAGES: [&str; 4] = ["Visit", "Signup", "Enroll", "Return Week 2"];
/// Creator funnel stage names, top of funnel first.
pub const CREATOR_STAGES: [&str; 4] = ["Visit", "Course Created", "Course Published", "First Sale"];

/// Learner funnel report; durations are in hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerFunnelReport {
    pub steps: Vec<FunnelStepReport>,
    /// First visit to first enrollment, across actors who enrolled.
    pub total_duration: DurationStats,
}

/// Creator funnel report; durations are in days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorFunnelReport {
    pub steps: Vec<FunnelStepReport>,
    pub stuck_creators: Vec<StuckActor>,
}

/// Stateless funnel aggregation engine over a shared event log.
pub struct FunnelEngine {
    log: Arc<EventLog>,
    config: FunnelConfig,
}

impl FunnelEngine {
    pub fn new(log: Arc<EventLog>, config: FunnelConfig) -> Self {
        info!(
            staleness_window_days = config.staleness_window_days,
            stuck_result_cap = config.stuck_result_cap,
            "Funnel engine initialized"
        );
        Self { log, config }
    }

    /// Visit → signup → enroll → week-2 return, counted over `[start, end]`
    /// and optionally scoped to one storefront.
    pub fn learner_funnel(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tenant_id: Option<&str>,
    ) -> HubResult<LearnerFunnelReport> {
        self.check_window(start, end)?;
        debug!(tenant_id = ?tenant_id, "Computing learner funnel");

        let scoped = self.log.events_between(start, end, tenant_id)?;
        let visits = unique_actors(&scoped, EventType::PageView);
        let signups = unique_actors(&scoped, EventType::Signup);

        // Enrollments are tenant-scoped through the ownership registry, not
        // the event's own tenant field.
        let (enrollments, enroll_earliest) = match tenant_id {
            Some(tenant) => {
                let owned = self.log.owned_resources(tenant);
                let all = self.log.events_between(start, end, None)?;
                (
                    unique_actors_for_resources(&all, EventType::Enrollment, &owned),
                    earliest_by_actor_for_resources(&all, EventType::Enrollment, &owned),
                )
            }
            None => (
                unique_actors(&scoped, EventType::Enrollment),
                earliest_by_actor(&scoped, EventType::Enrollment),
            ),
        };

        // Signed-up actors who came back during the week-2 window.
        let ret_start = start + Duration::days(self.config.return_window_offset_days);
        let ret_end = cmp::min(
            end,
            ret_start + Duration::days(self.config.return_window_length_days),
        );
        let returners: HashSet<String> = if ret_start <= ret_end {
            let ret_events = self.log.events_between(ret_start, ret_end, tenant_id)?;
            unique_actors(&ret_events, EventType::PageView)
                .intersection(&signups)
                .cloned()
                .collect()
        } else {
            HashSet::new()
        };

        let mut steps = build_steps(&[
            (LEARNER_STAGES[0], visits.len() as u64),
            (LEARNER_STAGES[1], signups.len() as u64),
            (LEARNER_STAGES[2], enrollments.len() as u64),
            (LEARNER_STAGES[3], returners.len() as u64),
        ]);
        // Preserved reporting quirk: the final stage's conversion rate is the
        // share of signups that returned, while its drop-off stays relative
        // to the enrollment count.
        steps[3].conversion_rate = rate_over(returners.len() as u64, signups.len() as u64);

        let visit_earliest = earliest_by_actor(&scoped, EventType::PageView);
        let durations = link_stages(&visit_earliest, &enroll_earliest);

        Ok(LearnerFunnelReport {
            steps,
            total_duration: stats(&durations, DurationUnit::Hours),
        })
    }

    /// Visit → course created → course published → first sale, with
    /// stage-to-stage medians and stuck-creator detection.
    pub fn creator_funnel(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tenant_id: Option<&str>,
    ) -> HubResult<CreatorFunnelReport> {
        self.check_window(start, end)?;
        debug!(tenant_id = ?tenant_id, "Computing creator funnel");

        let scoped = self.log.events_between(start, end, tenant_id)?;
        let visits = unique_actors(&scoped, EventType::PageView);
        let created = unique_actors(&scoped, EventType::CourseCreated);
        let published = unique_actors(&scoped, EventType::CoursePublished);

        let visit_earliest = earliest_by_actor(&scoped, EventType::PageView);
        let created_earliest = earliest_by_actor(&scoped, EventType::CourseCreated);
        let published_earliest = earliest_by_actor(&scoped, EventType::CoursePublished);

        // A sale event's actor is the buyer; the funnel actor is the creator
        // owning the sold resource, resolved through the ownership registry.
        let sale_slice = match tenant_id {
            Some(_) => self.log.events_between(start, end, None)?,
            None => scoped,
        };
        let first_sale_earliest = self.first_sale_by_creator(&sale_slice, tenant_id);
        let sellers: HashSet<String> = first_sale_earliest.keys().cloned().collect();

        let mut steps = build_steps(&[
            (CREATOR_STAGES[0], visits.len() as u64),
            (CREATOR_STAGES[1], created.len() as u64),
            (CREATOR_STAGES[2], published.len() as u64),
            (CREATOR_STAGES[3], sellers.len() as u64),
        ]);
        steps[0].median_time_to_next =
            Some(stats(&link_stages(&visit_earliest, &created_earliest), DurationUnit::Days).median);
        steps[1].median_time_to_next = Some(
            stats(&link_stages(&created_earliest, &published_earliest), DurationUnit::Days).median,
        );
        steps[2].median_time_to_next = Some(
            stats(&link_stages(&published_earliest, &first_sale_earliest), DurationUnit::Days)
                .median,
        );

        let stuck_creators = detect_stuck(
            &created_earliest,
            &published,
            CREATOR_STAGES[1],
            Duration::days(self.config.staleness_window_days),
            self.config.stuck_result_cap,
            Utc::now(),
        );

        Ok(CreatorFunnelReport {
            steps,
            stuck_creators,
        })
    }

    /// Actors sitting on `step` for at least `days_stuck` days without
    /// reaching the following stage, scanning the whole log.
    pub fn stuck_users(
        &self,
        funnel: FunnelKind,
        step: &str,
        days_stuck: i64,
    ) -> HubResult<Vec<StuckUserDetail>> {
        let stages: &[&str] = match funnel {
            FunnelKind::Learner => &LEARNER_STAGES,
            FunnelKind::Creator => &CREATOR_STAGES,
        };
        let index = stages
            .iter()
            .position(|s| *s == step)
            .ok_or_else(|| HubError::UnknownStage(step.to_string()))?;
        if index + 1 == stages.len() {
            return Err(HubError::Validation(format!(
                "'{step}' is the final stage of the {funnel:?} funnel and has no next step"
            )));
        }

        let now = Utc::now();
        let events = self.log.events_between(DateTime::<Utc>::MIN_UTC, now, None)?;
        let entered = earliest_by_actor(&events, stage_event_type(funnel, index));

        // An actor has moved on once a next-stage event exists after their
        // earliest entry into this stage. The strict ordering matters for the
        // learner funnel, where Visit and Return Week 2 share page_view.
        let next_stage = stages[index + 1];
        let reached: HashSet<String> = if next_stage == CREATOR_STAGES[3] {
            self.first_sale_by_creator(&events, None)
                .into_iter()
                .filter(|(creator, sale_ts)| {
                    entered.get(creator).map_or(false, |t0| sale_ts > t0)
                })
                .map(|(creator, _)| creator)
                .collect()
        } else {
            let next_type = stage_event_type(funnel, index + 1);
            events
                .iter()
                .filter(|e| e.event_type == next_type)
                .filter(|e| {
                    entered
                        .get(&e.actor_key)
                        .map_or(false, |t0| e.timestamp > *t0)
                })
                .map(|e| e.actor_key.clone())
                .collect()
        };

        let cutoff = now - Duration::days(days_stuck);
        let details = entered
            .iter()
            .filter(|(actor, _)| !reached.contains(*actor))
            .filter(|(_, ts)| **ts < cutoff)
            .map(|(actor, ts)| StuckUserDetail {
                user_id: actor.clone(),
                stuck_at: step.to_string(),
                days_since_step: (now - *ts).num_days(),
                last_activity: self.log.last_activity(actor),
            })
            .take(self.config.stuck_result_cap)
            .collect();
        Ok(details)
    }

    fn check_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> HubResult<()> {
        if end < start {
            return Err(HubError::Validation(format!(
                "query window end {end} precedes start {start}"
            )));
        }
        Ok(())
    }

    /// Earliest sale timestamp per creator, resolved resource → owner.
    fn first_sale_by_creator(
        &self,
        events: &[creatorhub_core::types::Event],
        tenant_id: Option<&str>,
    ) -> HashMap<String, DateTime<Utc>> {
        let mut earliest: HashMap<String, DateTime<Utc>> = HashMap::new();
        for event in events.iter().filter(|e| e.event_type == EventType::Sale) {
            let Some(resource_id) = &event.resource_id else {
                continue;
            };
            let Some(owner) = self.log.resource_owner(resource_id) else {
                continue;
            };
            if tenant_id.map_or(false, |t| owner.tenant_id != t) {
                continue;
            }
            earliest
                .entry(owner.owner_key)
                .and_modify(|ts| {
                    if event.timestamp < *ts {
                        *ts = event.timestamp;
                    }
                })
                .or_insert(event.timestamp);
        }
        earliest
    }
}

fn stage_event_type(funnel: FunnelKind, index: usize) -> EventType {
    match funnel {
        FunnelKind::Learner => match index {
            0 => EventType::PageView,
            1 => EventType::Signup,
            2 => EventType::Enrollment,
            _ => EventType::PageView,
        },
        FunnelKind::Creator => match index {
            0 => EventType::PageView,
            1 => EventType::CourseCreated,
            2 => EventType::CoursePublished,
            _ => EventType::Sale,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use creatorhub_core::types::{Event, ResourceOwner};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn engine_with_log() -> (FunnelEngine, Arc<EventLog>) {
        let log = Arc::new(EventLog::new());
        let engine = FunnelEngine::new(Arc::clone(&log), FunnelConfig::default());
        (engine, log)
    }

    #[test]
    fn test_empty_window_has_no_division_errors() {
        let (engine, _log) = engine_with_log();
        let report = engine.learner_funnel(ts(0), ts(1_000_000), None).unwrap();

        assert_eq!(report.steps.len(), 4);
        assert_eq!(report.steps[0].conversion_rate, 100.0);
        assert_eq!(report.steps[0].drop_off, 0.0);
        for step in &report.steps[1..] {
            assert_eq!(step.count, 0);
            assert_eq!(step.conversion_rate, 0.0);
        }
        assert_eq!(report.total_duration, DurationStats::zero());

        let creator = engine.creator_funnel(ts(0), ts(1_000_000), None).unwrap();
        assert!(creator.stuck_creators.is_empty());
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let (engine, _log) = engine_with_log();
        let err = engine.learner_funnel(ts(100), ts(0), None).unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));
    }

    #[test]
    fn test_unknown_stage_is_a_typed_error() {
        let (engine, _log) = engine_with_log();
        let err = engine
            .stuck_users(FunnelKind::Learner, "Checkout", 7)
            .unwrap_err();
        assert!(matches!(err, HubError::UnknownStage(_)));
    }

    #[test]
    fn test_final_stage_has_no_next_step() {
        let (engine, _log) = engine_with_log();
        let err = engine
            .stuck_users(FunnelKind::Creator, "First Sale", 7)
            .unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));
    }

    #[test]
    fn test_tenant_scoped_enrollments_use_ownership_join() {
        let (engine, log) = engine_with_log();
        log.set_resource_owner(
            "course_a",
            ResourceOwner {
                tenant_id: "store_1".to_string(),
                owner_key: "creator_1".to_string(),
            },
        );
        log.set_resource_owner(
            "course_b",
            ResourceOwner {
                tenant_id: "store_2".to_string(),
                owner_key: "creator_2".to_string(),
            },
        );

        // Visits and signups carry the storefront tag; enrollments do not.
        log.record(Event::new(EventType::PageView, "u1", Some("store_1"), None, ts(10)));
        log.record(Event::new(EventType::Signup, "u1", Some("store_1"), None, ts(20)));
        log.record(Event::new(EventType::Enrollment, "u1", None, Some("course_a"), ts(30)));
        log.record(Event::new(EventType::Enrollment, "u2", None, Some("course_b"), ts(30)));

        let report = engine.learner_funnel(ts(0), ts(100), Some("store_1")).unwrap();
        assert_eq!(report.steps[2].count, 1);

        let unscoped = engine.learner_funnel(ts(0), ts(100), None).unwrap();
        assert_eq!(unscoped.steps[2].count, 2);
    }

    #[test]
    fn test_creator_funnel_resolves_sales_to_owners() {
        let (engine, log) = engine_with_log();
        log.set_resource_owner(
            "course_a",
            ResourceOwner {
                tenant_id: "store_1".to_string(),
                owner_key: "creator_1".to_string(),
            },
        );

        let day = 86_400;
        log.record(Event::new(EventType::PageView, "creator_1", None, None, ts(0)));
        log.record(Event::new(EventType::CourseCreated, "creator_1", Some("store_1"), Some("course_a"), ts(day)));
        log.record(Event::new(EventType::CoursePublished, "creator_1", Some("store_1"), Some("course_a"), ts(2 * day)));
        // Two sales by different buyers; the creator counts once.
        log.record(Event::new(EventType::Sale, "buyer_1", Some("store_1"), Some("course_a"), ts(4 * day)));
        log.record(Event::new(EventType::Sale, "buyer_2", Some("store_1"), Some("course_a"), ts(3 * day)));

        let report = engine.creator_funnel(ts(0), ts(10 * day), None).unwrap();
        assert_eq!(report.steps[3].name, "First Sale");
        assert_eq!(report.steps[3].count, 1);
        // Published at day 2, earliest sale at day 3.
        assert_eq!(report.steps[2].median_time_to_next, Some(1.0));
        assert_eq!(report.steps[1].median_time_to_next, Some(1.0));
        assert_eq!(report.steps[3].median_time_to_next, None);
    }

    #[test]
    fn test_stuck_creator_appears_with_floored_days() {
        let (engine, log) = engine_with_log();
        let now = Utc::now();

        log.record(Event::new(
            EventType::CourseCreated,
            "slow_creator",
            None,
            Some("course_x"),
            now - Duration::days(12),
        ));
        log.record(Event::new(
            EventType::CourseCreated,
            "fast_creator",
            None,
            Some("course_y"),
            now - Duration::days(12),
        ));
        log.record(Event::new(
            EventType::CoursePublished,
            "fast_creator",
            None,
            Some("course_y"),
            now - Duration::days(11),
        ));

        let report = engine
            .creator_funnel(now - Duration::days(30), now, None)
            .unwrap();
        assert_eq!(report.stuck_creators.len(), 1);
        assert_eq!(report.stuck_creators[0].user_id, "slow_creator");
        assert_eq!(report.stuck_creators[0].current_step, "Course Created");
        assert_eq!(report.stuck_creators[0].days_since_step, 12);
    }

    #[test]
    fn test_stuck_users_reports_last_activity() {
        let (engine, log) = engine_with_log();
        let now = Utc::now();

        // Signed up 20 days ago, browsed 2 days ago, never enrolled.
        log.record(Event::new(EventType::Signup, "lurker", None, None, now - Duration::days(20)));
        log.record(Event::new(EventType::PageView, "lurker", None, None, now - Duration::days(2)));
        // Signed up and enrolled.
        log.record(Event::new(EventType::Signup, "student", None, None, now - Duration::days(20)));
        log.record(Event::new(
            EventType::Enrollment,
            "student",
            None,
            Some("course_a"),
            now - Duration::days(19),
        ));

        let stuck = engine.stuck_users(FunnelKind::Learner, "Signup", 7).unwrap();
        assert_eq!(stuck.len(), 1);
        assert_eq!(stuck[0].user_id, "lurker");
        assert_eq!(stuck[0].stuck_at, "Signup");
        assert_eq!(stuck[0].days_since_step, 20);
        assert_eq!(stuck[0].last_activity, Some(now - Duration::days(2)));
    }

    #[test]
    fn test_visit_stage_ignores_page_views_before_entry() {
        let (engine, log) = engine_with_log();
        let now = Utc::now();

        // One page view and nothing else: stuck at Visit, since the only
        // signup-stage candidate event does not exist.
        log.record(Event::new(EventType::PageView, "window_shopper", None, None, now - Duration::days(15)));
        // Visited then signed up afterwards: moved on.
        log.record(Event::new(EventType::PageView, "converted", None, None, now - Duration::days(15)));
        log.record(Event::new(EventType::Signup, "converted", None, None, now - Duration::days(14)));

        let stuck = engine.stuck_users(FunnelKind::Learner, "Visit", 7).unwrap();
        assert_eq!(stuck.len(), 1);
        assert_eq!(stuck[0].user_id, "window_shopper");
    }
}
