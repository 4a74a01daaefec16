use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable instrumentation fact recorded by the platform.
///
/// `actor_key` is the user id when the actor is authenticated, otherwise an
/// anonymous session id. Events are append-only; nothing downstream mutates
/// or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub actor_key: String,
    /// Storefront the event occurred on, when known.
    pub tenant_id: Option<String>,
    /// Course or product the event refers to, when applicable.
    pub resource_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Convenience constructor for instrumentation call sites.
    pub fn new(
        event_type: EventType,
        actor_key: impl Into<String>,
        tenant_id: Option<&str>,
        resource_id: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            actor_key: actor_key.into(),
            tenant_id: tenant_id.map(|s| s.to_string()),
            resource_id: resource_id.map(|s| s.to_string()),
            timestamp,
        }
    }
}

/// Instrumented event types across the platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // Learner-side events
    PageView,
    Signup,
    Login,
    Enrollment,
    LessonCompleted,
    WishlistAdded,
    // Creator-side events
    CourseCreated,
    CoursePublished,
    // Commerce events
    Sale,
    Refund,
}

/// Ownership record for a tenant-scoped resource (course or product).
///
/// Cohorts for resource-linked stages join against this instead of relying on
/// the event's own tenant field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOwner {
    /// Storefront that owns the resource.
    pub tenant_id: String,
    /// User key of the creator who owns the storefront.
    pub owner_key: String,
}

/// Which funnel a stuck-user query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelKind {
    Learner,
    Creator,
}
