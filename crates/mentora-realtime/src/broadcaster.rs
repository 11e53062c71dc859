use std::sync::Arc;

use mentora_bus::EventBus;
use mentora_core::{Event, EventType, RoomId};
use serde_json::{Map, Value};
use tracing::debug;

use crate::registry::{ConnectionId, ConnectionRegistry, EventSink};

/// The sole write path for domain events.
///
/// CRUD handlers persist their change, then call [`broadcast`] — the
/// broadcaster stamps the envelope, publishes it on the bus for in-process
/// listeners, and pushes the encoded frame to every live connection in the
/// room. Delivery is at-most-once and best-effort: no queuing, no retry, no
/// buffering for slow consumers, and a client that reconnects after a gap
/// has permanently missed whatever was emitted while it was away.
///
/// [`broadcast`]: Broadcaster::broadcast
pub struct Broadcaster {
    bus: Arc<EventBus>,
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(bus: Arc<EventBus>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { bus, registry }
    }

    /// Announce a domain event. Fire-and-forget: never returns an error to
    /// the caller — a dead sink is deregistered, a failing bus listener is
    /// logged, and the CRUD handler that called us is unaffected either way.
    ///
    /// Payload shape is the caller's responsibility; the envelope only adds
    /// the normalized `type`, `room`, and `emittedAt` fields on top.
    pub fn broadcast(&self, room: RoomId, event_type: EventType, payload: Map<String, Value>) {
        let event = Event::new(room, event_type, payload);

        // bus listeners first, in registration order — secondary effects see
        // the event even when nobody is streaming
        self.bus.publish(&event);

        let frame = event.to_frame();
        let delivered = self
            .registry
            .for_each_in_room(&event.room, |sink| sink.send_frame(&frame));
        debug!(event = %event.event_type, room = %event.room, delivered, "broadcast fanned out");
    }

    /// Called by the streaming acceptance layer when a client opens a stream.
    pub fn open_connection(&self, sink: Box<dyn EventSink>, room: RoomId) -> ConnectionId {
        self.registry.register(sink, room)
    }

    /// Called on client disconnect. Idempotent.
    pub fn close_connection(&self, handle: ConnectionId) {
        self.registry.deregister(handle);
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }
}
