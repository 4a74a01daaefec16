//! Append-only event log backed by DashMap, with a resource-ownership
//! registry for tenant-scoped cohort joins.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use creatorhub_core::types::{Event, ResourceOwner};
use creatorhub_core::HubResult;
use dashmap::DashMap;
use uuid::Uuid;

/// In-memory event store. Events are append-only; the funnel queries never
/// mutate or delete them.
pub struct EventLog {
    events: DashMap<Uuid, Event>,
    owners: DashMap<String, ResourceOwner>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
            owners: DashMap::new(),
        }
    }

    /// Append an instrumentation event.
    pub fn record(&self, event: Event) {
        self.events.insert(event.event_id, event);
    }

    /// Register the owning tenant and creator for a course or product.
    pub fn set_resource_owner(&self, resource_id: impl Into<String>, owner: ResourceOwner) {
        self.owners.insert(resource_id.into(), owner);
    }

    /// All events with `start <= timestamp <= end`, optionally restricted to
    /// events tagged with the given tenant.
    pub fn events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tenant_id: Option<&str>,
    ) -> HubResult<Vec<Event>> {
        let events = self
            .events
            .iter()
            .filter(|e| {
                let ev = e.value();
                ev.timestamp >= start
                    && ev.timestamp <= end
                    && tenant_id.map_or(true, |t| ev.tenant_id.as_deref() == Some(t))
            })
            .map(|e| e.value().clone())
            .collect();
        Ok(events)
    }

    /// Resource ids owned by the given tenant.
    pub fn owned_resources(&self, tenant_id: &str) -> HashSet<String> {
        self.owners
            .iter()
            .filter(|o| o.value().tenant_id == tenant_id)
            .map(|o| o.key().clone())
            .collect()
    }

    /// Ownership record for a single resource.
    pub fn resource_owner(&self, resource_id: &str) -> Option<ResourceOwner> {
        self.owners.get(resource_id).map(|o| o.value().clone())
    }

    /// Timestamp of the actor's most recent event of any type.
    pub fn last_activity(&self, actor_key: &str) -> Option<DateTime<Utc>> {
        self.events
            .iter()
            .filter(|e| e.value().actor_key == actor_key)
            .map(|e| e.value().timestamp)
            .max()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use creatorhub_core::types::EventType;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let log = EventLog::new();
        for secs in [99, 100, 150, 200, 201] {
            log.record(Event::new(
                EventType::PageView,
                format!("actor_{secs}"),
                None,
                None,
                ts(secs),
            ));
        }

        let window = log.events_between(ts(100), ts(200), None).unwrap();
        assert_eq!(window.len(), 3);
        assert!(window.iter().all(|e| e.timestamp >= ts(100) && e.timestamp <= ts(200)));
    }

    #[test]
    fn test_tenant_filter_matches_event_field() {
        let log = EventLog::new();
        log.record(Event::new(EventType::Signup, "a1", Some("store_1"), None, ts(10)));
        log.record(Event::new(EventType::Signup, "a2", Some("store_2"), None, ts(10)));
        log.record(Event::new(EventType::Signup, "a3", None, None, ts(10)));

        let scoped = log.events_between(ts(0), ts(100), Some("store_1")).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].actor_key, "a1");

        let all = log.events_between(ts(0), ts(100), None).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_ownership_registry() {
        let log = EventLog::new();
        log.set_resource_owner(
            "course_1",
            ResourceOwner {
                tenant_id: "store_1".to_string(),
                owner_key: "creator_1".to_string(),
            },
        );
        log.set_resource_owner(
            "course_2",
            ResourceOwner {
                tenant_id: "store_2".to_string(),
                owner_key: "creator_2".to_string(),
            },
        );

        let owned = log.owned_resources("store_1");
        assert!(owned.contains("course_1"));
        assert!(!owned.contains("course_2"));
        assert_eq!(log.resource_owner("course_2").unwrap().owner_key, "creator_2");
    }

    #[test]
    fn test_last_activity_is_max_timestamp() {
        let log = EventLog::new();
        log.record(Event::new(EventType::PageView, "a1", None, None, ts(50)));
        log.record(Event::new(EventType::Enrollment, "a1", None, Some("c1"), ts(500)));
        log.record(Event::new(EventType::PageView, "a1", None, None, ts(200)));

        assert_eq!(log.last_activity("a1"), Some(ts(500)));
        assert_eq!(log.last_activity("missing"), None);
        assert_eq!(log.len(), 3);
    }
}
