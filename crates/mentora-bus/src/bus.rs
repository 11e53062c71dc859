use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use mentora_core::config::LISTENER_SOFT_CAP;
use mentora_core::{Event, EventType};
use tracing::warn;

/// Boxed listener callback. A listener that returns `Err` is logged by the
/// bus; the error never reaches the publisher or the remaining listeners.
type Handler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Opaque handle returned by [`EventBus::subscribe`], used to detach exactly
/// that listener later. Unsubscribing an already-removed handle is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Listener {
    id: u64,
    handler: Handler,
}

/// In-process publish/subscribe keyed by [`EventType`].
///
/// One instance is built by the composition root at startup and shared via
/// `Arc` for the life of the process — there is no global and no teardown.
/// Dispatch is synchronous and in registration order; listeners for a type
/// are invoked within the publishing call.
pub struct EventBus {
    listeners: Mutex<HashMap<EventType, Vec<Listener>>>,
    next_id: AtomicU64,
    soft_cap: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_listener_cap(LISTENER_SOFT_CAP)
    }

    /// Same bus with a non-default leak-warning threshold.
    pub fn with_listener_cap(soft_cap: usize) -> Self {
        Self {
            listeners: Mutex::new(HashMap::with_capacity(EventType::ALL.len())),
            next_id: AtomicU64::new(1),
            soft_cap,
        }
    }

    /// Register a listener for one event type. Never fails; duplicate
    /// registrations of the same closure are all retained and all invoked.
    ///
    /// Exceeding the soft cap (default [`LISTENER_SOFT_CAP`]) for a single
    /// type logs a warning — it is a leak-detection aid, not a limit.
    pub fn subscribe(
        &self,
        event_type: EventType,
        handler: impl Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut map = self.lock_listeners();
        let entries = map.entry(event_type).or_default();
        entries.push(Listener {
            id,
            handler: Arc::new(handler),
        });
        if entries.len() > self.soft_cap {
            warn!(
                event = %event_type,
                count = entries.len(),
                cap = self.soft_cap,
                "bus listener count exceeds soft cap — possible subscription leak"
            );
        }
        SubscriptionId(id)
    }

    /// Invoke every listener registered for the event's exact type, in
    /// registration order. A failing listener is logged and skipped; it
    /// never aborts delivery to the rest.
    ///
    /// The listener list is snapshotted before dispatch, so listeners may
    /// subscribe or unsubscribe re-entrantly; additions during a publish are
    /// not invoked for that event.
    pub fn publish(&self, event: &Event) {
        let snapshot: Vec<(u64, Handler)> = {
            let map = self.lock_listeners();
            map.get(&event.event_type)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|l| (l.id, Arc::clone(&l.handler)))
                        .collect()
                })
                .unwrap_or_default()
        };

        for (id, handler) in snapshot {
            if let Err(e) = handler(event) {
                warn!(
                    event = %event.event_type,
                    room = %event.room,
                    subscription = id,
                    error = %e,
                    "bus listener failed"
                );
            }
        }
    }

    /// Detach exactly the listener behind `sub`. Idempotent.
    pub fn unsubscribe(&self, sub: SubscriptionId) {
        let mut map = self.lock_listeners();
        for entries in map.values_mut() {
            entries.retain(|l| l.id != sub.0);
        }
    }

    /// Current listener count for one type (diagnostics and tests).
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.lock_listeners()
            .get(&event_type)
            .map(Vec::len)
            .unwrap_or(0)
    }

    // Listener closures never run under the lock, so a poisoned mutex can
    // only mean a panic inside plain Vec/HashMap ops — recover the guard.
    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, HashMap<EventType, Vec<Listener>>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
