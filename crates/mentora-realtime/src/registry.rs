use std::sync::Arc;

use dashmap::DashMap;
use mentora_bus::{EventBus, SubscriptionId};
use mentora_core::RoomId;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SinkError;

/// Write side of one streaming connection.
///
/// Implementations must not block: a full or closed transport returns `Err`
/// and the registry treats the connection as dead.
pub trait EventSink: Send + Sync {
    fn send_frame(&self, frame: &str) -> Result<(), SinkError>;
}

/// Opaque connection handle. The accepting layer keeps only this; the
/// registry owns everything else about the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One live connection: its room scope, its transport, and the bus
/// subscriptions opened on its behalf. A connection belongs to exactly one
/// room for its entire lifetime; a reconnect is a brand-new connection.
struct Connection {
    room: RoomId,
    sink: Box<dyn EventSink>,
    subscriptions: Vec<SubscriptionId>,
}

/// Owns the mapping from live connections to their room and bus
/// subscriptions. Registration, deregistration, and fan-out iteration are
/// the only ways in — no external collaborator touches the table directly.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Connection>,
    bus: Arc<EventBus>,
}

impl ConnectionRegistry {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            connections: DashMap::new(),
            bus,
        }
    }

    /// Store a new connection under a fresh handle and return the handle.
    /// Handles never collide; the registry takes ownership of the sink.
    pub fn register(&self, sink: Box<dyn EventSink>, room: RoomId) -> ConnectionId {
        let handle = ConnectionId::fresh();
        info!(conn_id = %handle, room = %room, "connection registered");
        self.connections.insert(
            handle,
            Connection {
                room,
                sink,
                subscriptions: Vec::new(),
            },
        );
        handle
    }

    /// Record a bus subscription opened on behalf of `handle`, so it is torn
    /// down with the connection. If the connection is already gone the
    /// subscription is released immediately — nothing may dangle.
    pub fn attach_subscription(&self, handle: ConnectionId, sub: SubscriptionId) {
        match self.connections.get_mut(&handle) {
            Some(mut conn) => conn.subscriptions.push(sub),
            None => self.bus.unsubscribe(sub),
        }
    }

    /// Remove the connection and release every bus subscription recorded on
    /// it. Safe to call with an unknown or already-removed handle — closing
    /// twice is a no-op, never an error.
    pub fn deregister(&self, handle: ConnectionId) {
        if let Some((_, conn)) = self.connections.remove(&handle) {
            for sub in conn.subscriptions {
                self.bus.unsubscribe(sub);
            }
            info!(conn_id = %handle, room = %conn.room, "connection closed");
        }
    }

    /// Apply `write` to the sink of every live connection in `room`,
    /// returning how many writes succeeded.
    ///
    /// A failed write is an implicit close: the connection is deregistered
    /// on the spot and the error never escapes to the caller. Failed handles
    /// are collected during iteration and removed after it, so removal never
    /// races the iteration itself.
    pub fn for_each_in_room(
        &self,
        room: &RoomId,
        mut write: impl FnMut(&dyn EventSink) -> Result<(), SinkError>,
    ) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();

        for entry in self.connections.iter() {
            if entry.room == *room {
                match write(entry.sink.as_ref()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        debug!(conn_id = %entry.key(), room = %room, error = %e,
                               "sink write failed — treating connection as closed");
                        failed.push(*entry.key());
                    }
                }
            }
        }
        for handle in failed {
            self.deregister(handle);
        }
        delivered
    }

    /// Number of live connections across all rooms.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether `handle` is still registered.
    pub fn is_open(&self, handle: ConnectionId) -> bool {
        self.connections.contains_key(&handle)
    }
}
