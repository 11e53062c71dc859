//! Presence derivation endpoint — GET /presence?lastSeenAt=<rfc3339>
//!
//! The caller (the CRUD side, which owns heartbeat storage) supplies the
//! last-seen timestamp it already fetched; this layer only derives the
//! verdict. A missing timestamp is a valid query and resolves to offline.

use axum::{extract::Query, Json};
use chrono::{DateTime, Utc};
use mentora_realtime::{is_online, PresenceStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceQuery {
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
}

pub async fn presence_handler(Query(query): Query<PresenceQuery>) -> Json<PresenceStatus> {
    Json(PresenceStatus {
        online: is_online(Utc::now(), query.last_seen_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // serde_json exercises the same Deserialize impl the query-string
    // extractor uses for the RFC3339 timestamp.
    #[test]
    fn query_parses_rfc3339() {
        let q: PresenceQuery =
            serde_json::from_value(serde_json::json!({"lastSeenAt": "2026-08-30T12:00:00Z"}))
                .unwrap();
        assert!(q.last_seen_at.is_some());
    }

    #[test]
    fn query_without_timestamp_is_valid() {
        let q: PresenceQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(q.last_seen_at.is_none());
    }
}
