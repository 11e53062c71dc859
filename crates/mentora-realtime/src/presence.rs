use chrono::{DateTime, Duration, Utc};
use mentora_core::config::PRESENCE_THRESHOLD_MS;
use serde::Serialize;

/// Derived online/offline verdict, as returned by the presence endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresenceStatus {
    pub online: bool,
}

/// Derive online status from a supplied last-heartbeat timestamp.
///
/// Pure: no clock access, no storage — the heartbeat recorder lives
/// elsewhere and hands us the timestamp it already fetched. A missing
/// timestamp is offline, not an error. The threshold comparison is strict,
/// so a heartbeat exactly 30s old already counts as offline.
pub fn is_online(now: DateTime<Utc>, last_seen_at: Option<DateTime<Utc>>) -> bool {
    match last_seen_at {
        Some(seen) => now.signed_duration_since(seen) < Duration::milliseconds(PRESENCE_THRESHOLD_MS),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn just_inside_the_threshold_is_online() {
        let now = Utc::now();
        let seen = now - Duration::milliseconds(PRESENCE_THRESHOLD_MS - 1);
        assert!(is_online(now, Some(seen)));
    }

    #[test]
    fn exactly_on_the_threshold_is_offline() {
        let now = Utc::now();
        let seen = now - Duration::milliseconds(PRESENCE_THRESHOLD_MS);
        assert!(!is_online(now, Some(seen)));
    }

    #[test]
    fn well_past_the_threshold_is_offline() {
        let now = Utc::now();
        let seen = now - Duration::hours(2);
        assert!(!is_online(now, Some(seen)));
    }

    #[test]
    fn absent_heartbeat_is_offline() {
        assert!(!is_online(Utc::now(), None));
    }

    #[test]
    fn fresh_heartbeat_is_online() {
        let now = Utc::now();
        assert!(is_online(now, Some(now)));
    }
}
