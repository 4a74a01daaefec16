//! Cohort building: per-stage unique-actor sets derived from an event slice.
//!
//! An actor with zero qualifying events is simply absent from the set; an
//! actor with several qualifying events counts once.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use creatorhub_core::types::{Event, EventType};

/// Unique actors that produced at least one event of the given type.
pub fn unique_actors(events: &[Event], event_type: EventType) -> HashSet<String> {
    events
        .iter()
        .filter(|e| e.event_type == event_type)
        .map(|e| e.actor_key.clone())
        .collect()
}

/// Unique actors whose qualifying event touched one of the given resources.
///
/// Used for resource-linked stages (enrollments, sales) where tenant scope is
/// a join against the ownership registry rather than an event-field filter.
pub fn unique_actors_for_resources(
    events: &[Event],
    event_type: EventType,
    resources: &HashSet<String>,
) -> HashSet<String> {
    events
        .iter()
        .filter(|e| e.event_type == event_type)
        .filter(|e| {
            e.resource_id
                .as_ref()
                .map_or(false, |r| resources.contains(r))
        })
        .map(|e| e.actor_key.clone())
        .collect()
}

/// Earliest timestamp per actor for events of the given type.
pub fn earliest_by_actor(
    events: &[Event],
    event_type: EventType,
) -> HashMap<String, DateTime<Utc>> {
    let mut earliest: HashMap<String, DateTime<Utc>> = HashMap::new();
    for event in events.iter().filter(|e| e.event_type == event_type) {
        earliest
            .entry(event.actor_key.clone())
            .and_modify(|ts| {
                if event.timestamp < *ts {
                    *ts = event.timestamp;
                }
            })
            .or_insert(event.timestamp);
    }
    earliest
}

/// Earliest timestamp per actor, restricted to events on the given resources.
pub fn earliest_by_actor_for_resources(
    events: &[Event],
    event_type: EventType,
    resources: &HashSet<String>,
) -> HashMap<String, DateTime<Utc>> {
    let scoped: Vec<Event> = events
        .iter()
        .filter(|e| {
            e.resource_id
                .as_ref()
                .map_or(false, |r| resources.contains(r))
        })
        .cloned()
        .collect();
    earliest_by_actor(&scoped, event_type)
}
