//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the API state. Handlers
//! publish after their database write commits; subscribers never block the
//! request.

use chrono::{DateTime, Utc};
use fosterdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A contract moved to `sent`. Payload: `contract_name`, `recipient_email`,
/// `document_url`.
pub const EVENT_CONTRACT_SENT: &str = "contract.sent";

/// An initial or full assessment was recorded. Payload: `applicant_name`,
/// `email`, `assessment`, `result`, `reminder_id`.
pub const EVENT_ASSESSMENT_SUBMITTED: &str = "enquiry.assessment_submitted";

/// An enquiry was closed. Payload: `applicant_name`, `email`, `outcome`.
pub const EVENT_ENQUIRY_CLOSED: &str = "enquiry.closed";

/// A case changed status. Payload: `from`, `to`.
pub const EVENT_CASE_TRANSITIONED: &str = "case.transitioned";

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred in the CRM.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"contract.sent"`.
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// String field from the payload, if present and non-empty.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Events buffered per subscriber before the slowest one starts lagging.
/// Traffic is a handful of events per user action.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of [`PlatformEvent`]s to in-process subscribers.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Hand `event` to every current subscriber and return how many there
    /// were. With email automation disabled there are none, and the event is
    /// dropped.
    pub fn publish(&self, event: PlatformEvent) -> usize {
        let event_type = event.event_type.clone();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(event_type = %event_type, subscribers = delivered, "Event published");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new(EVENT_CONTRACT_SENT)
                .with_source("contract", 42)
                .with_actor(7)
                .with_payload(serde_json::json!({"recipient_email": "a@b.org"})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "contract.sent");
        assert_eq!(received.source_entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload_str("recipient_email"), Some("a@b.org"));
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(PlatformEvent::new("multi.test"));

        assert_eq!(rx1.recv().await.unwrap().event_type, "multi.test");
        assert_eq!(rx2.recv().await.unwrap().event_type, "multi.test");
    }

    #[test]
    fn publish_reports_subscriber_count() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(PlatformEvent::new(EVENT_ENQUIRY_CLOSED)), 0);

        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.publish(PlatformEvent::new(EVENT_ENQUIRY_CLOSED)), 1);
    }

    #[test]
    fn payload_str_ignores_empty_and_non_strings() {
        let event = PlatformEvent::new("x").with_payload(serde_json::json!({
            "empty": "",
            "number": 3,
            "name": "Jane"
        }));
        assert_eq!(event.payload_str("empty"), None);
        assert_eq!(event.payload_str("number"), None);
        assert_eq!(event.payload_str("missing"), None);
        assert_eq!(event.payload_str("name"), Some("Jane"));
    }
}
