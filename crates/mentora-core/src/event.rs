use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of realtime event types.
///
/// Every event pushed to a streaming client or published on the in-process
/// bus carries exactly one of these tags. The set is deliberately exhaustive:
/// adding a new type means adding a variant here and letting the compiler
/// point at every match that needs a new arm.
///
/// Wire strings are fixed — dot-separated for CRUD-side changes, colon-
/// separated for the push-only notifications the web client listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "application.created")]
    ApplicationCreated,
    #[serde(rename = "application.updated")]
    ApplicationUpdated,
    #[serde(rename = "suggestion.created")]
    SuggestionCreated,
    #[serde(rename = "suggestion.resolved")]
    SuggestionResolved,
    #[serde(rename = "reminder.created")]
    ReminderCreated,
    #[serde(rename = "mentoringPlan.updated")]
    MentoringPlanUpdated,
    #[serde(rename = "activityLog.created")]
    ActivityLogCreated,
    #[serde(rename = "message:new")]
    MessageNew,
    #[serde(rename = "notification:new")]
    NotificationNew,
    #[serde(rename = "insight:ready")]
    InsightReady,
    #[serde(rename = "reminder:due")]
    ReminderDue,
    #[serde(rename = "suggestion:new")]
    SuggestionNew,
    #[serde(rename = "dashboard:statsUpdated")]
    DashboardStatsUpdated,
}

impl EventType {
    /// The exact string clients see in the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ApplicationCreated => "application.created",
            EventType::ApplicationUpdated => "application.updated",
            EventType::SuggestionCreated => "suggestion.created",
            EventType::SuggestionResolved => "suggestion.resolved",
            EventType::ReminderCreated => "reminder.created",
            EventType::MentoringPlanUpdated => "mentoringPlan.updated",
            EventType::ActivityLogCreated => "activityLog.created",
            EventType::MessageNew => "message:new",
            EventType::NotificationNew => "notification:new",
            EventType::InsightReady => "insight:ready",
            EventType::ReminderDue => "reminder:due",
            EventType::SuggestionNew => "suggestion:new",
            EventType::DashboardStatsUpdated => "dashboard:statsUpdated",
        }
    }

    /// All variants — used by the bus to pre-size its listener table and by
    /// tests to sweep the full set.
    pub const ALL: [EventType; 13] = [
        EventType::ApplicationCreated,
        EventType::ApplicationUpdated,
        EventType::SuggestionCreated,
        EventType::SuggestionResolved,
        EventType::ReminderCreated,
        EventType::MentoringPlanUpdated,
        EventType::ActivityLogCreated,
        EventType::MessageNew,
        EventType::NotificationNew,
        EventType::InsightReady,
        EventType::ReminderDue,
        EventType::SuggestionNew,
        EventType::DashboardStatsUpdated,
    ];
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque conversation identifier used to scope event delivery.
///
/// The realtime layer holds no semantics about what a room is beyond
/// equality — it is handed already-resolved ids by the CRUD side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One realtime event, built fresh per broadcast and never persisted.
///
/// Wire: `data: {"type":"message:new","room":"c1","emittedAt":"…", …payload}\n\n`
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub room: RoomId,
    pub payload: Map<String, Value>,
    pub emitted_at: DateTime<Utc>,
}

impl Event {
    /// Build the immutable envelope: payload fields merged with the type,
    /// room, and a fresh timestamp.
    pub fn new(room: RoomId, event_type: EventType, payload: Map<String, Value>) -> Self {
        Self {
            event_type,
            room,
            payload,
            emitted_at: Utc::now(),
        }
    }

    /// The JSON object sent to clients. Envelope fields win over payload
    /// keys of the same name — the broadcaster normalizes, callers don't.
    pub fn to_json(&self) -> Value {
        let mut obj = self.payload.clone();
        obj.insert("type".to_string(), Value::String(self.event_type.as_str().to_string()));
        obj.insert("room".to_string(), Value::String(self.room.as_str().to_string()));
        obj.insert(
            "emittedAt".to_string(),
            Value::String(self.emitted_at.to_rfc3339()),
        );
        Value::Object(obj)
    }

    /// Encode as one self-contained SSE frame. Clients split on the blank
    /// line, so the double newline terminator is part of the contract.
    pub fn to_frame(&self) -> String {
        format!("data: {}\n\n", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_type_strings_round_trip_through_serde() {
        for et in EventType::ALL {
            let s = serde_json::to_string(&et).unwrap();
            assert_eq!(s, format!("\"{}\"", et.as_str()));
            let back: EventType = serde_json::from_str(&s).unwrap();
            assert_eq!(back, et);
        }
    }

    #[test]
    fn room_id_is_pure_equality() {
        assert_eq!(RoomId::from("c1"), RoomId::new("c1"));
        assert_ne!(RoomId::from("c1"), RoomId::from("c2"));
    }

    #[test]
    fn envelope_merges_payload_with_type_and_room() {
        let payload = json!({"conversationId": "c1", "messageId": "m1"});
        let Value::Object(map) = payload else { unreachable!() };
        let event = Event::new(RoomId::from("c1"), EventType::MessageNew, map);

        let obj = event.to_json();
        assert_eq!(obj["type"], "message:new");
        assert_eq!(obj["room"], "c1");
        assert_eq!(obj["conversationId"], "c1");
        assert_eq!(obj["messageId"], "m1");
        assert!(obj["emittedAt"].is_string());
    }

    #[test]
    fn envelope_fields_override_payload_keys() {
        let Value::Object(map) = json!({"type": "spoofed", "room": "other"}) else {
            unreachable!()
        };
        let event = Event::new(RoomId::from("c1"), EventType::InsightReady, map);
        let obj = event.to_json();
        assert_eq!(obj["type"], "insight:ready");
        assert_eq!(obj["room"], "c1");
    }

    #[test]
    fn frame_has_data_prefix_and_blank_line_terminator() {
        let event = Event::new(RoomId::from("c9"), EventType::ReminderDue, Map::new());
        let frame = event.to_frame();
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));
        // exactly one event per frame — no interior blank lines
        assert_eq!(frame.matches("\n\n").count(), 1);
    }
}
