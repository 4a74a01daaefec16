//! Funnel aggregation engine — multi-step conversion funnels, inter-stage
//! duration statistics, and stuck-actor detection over a raw event log.

pub mod calculator;
pub mod cohort;
pub mod engine;
pub mod event_log;
pub mod stage_link;
pub mod stuck;

pub use calculator::FunnelStepReport;
pub use engine::{CreatorFunnelReport, FunnelEngine, LearnerFunnelReport};
pub use event_log::EventLog;
pub use stage_link::DurationStats;
pub use stuck::{StuckActor, StuckUserDetail};
