// Verify the frame format matches what the web client's EventSource-style
// parser expects. These tests ensure wire compatibility is never broken.

use mentora_core::{Event, EventType, RoomId};
use serde_json::{json, Map, Value};

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("payload must be a JSON object"),
    }
}

#[test]
fn message_new_frame_shape() {
    let event = Event::new(
        RoomId::from("c1"),
        EventType::MessageNew,
        payload(json!({
            "conversationId": "c1",
            "messageId": "m1",
            "senderId": "u1",
            "senderRole": "mentee",
            "content": "hi",
            "createdAt": "t0",
        })),
    );

    let frame = event.to_frame();
    assert!(frame.starts_with("data: "));
    assert!(frame.ends_with("\n\n"));

    let body: Value = serde_json::from_str(frame.trim_start_matches("data: ").trim_end()).unwrap();
    assert_eq!(body["type"], "message:new");
    assert_eq!(body["room"], "c1");
    assert_eq!(body["conversationId"], "c1");
    assert_eq!(body["messageId"], "m1");
    assert_eq!(body["senderRole"], "mentee");
}

#[test]
fn notification_new_frame_shape() {
    let event = Event::new(
        RoomId::from("c2"),
        EventType::NotificationNew,
        payload(json!({
            "conversationId": "c2",
            "notificationId": "n1",
            "userId": "u2",
            "type": "mention",
            "title": "You were mentioned",
            "body": "…",
            "createdAt": "t1",
        })),
    );

    let body: Value =
        serde_json::from_str(event.to_frame().trim_start_matches("data: ").trim_end()).unwrap();
    // the envelope type wins over the payload's own "type" key
    assert_eq!(body["type"], "notification:new");
    assert_eq!(body["notificationId"], "n1");
    assert_eq!(body["userId"], "u2");
}

#[test]
fn frames_split_cleanly_on_double_newline() {
    let a = Event::new(RoomId::from("c1"), EventType::InsightReady, Map::new());
    let b = Event::new(RoomId::from("c1"), EventType::ReminderDue, Map::new());
    let stream = format!("{}{}", a.to_frame(), b.to_frame());

    let frames: Vec<&str> = stream.split("\n\n").filter(|s| !s.is_empty()).collect();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].contains("insight:ready"));
    assert!(frames[1].contains("reminder:due"));
}

#[test]
fn emitted_at_is_rfc3339() {
    let event = Event::new(RoomId::from("c1"), EventType::DashboardStatsUpdated, Map::new());
    let body = event.to_json();
    let ts = body["emittedAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}
