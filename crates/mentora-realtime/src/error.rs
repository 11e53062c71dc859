use thiserror::Error;

/// Why a frame could not be handed to a connection's transport.
///
/// Either way the connection is treated as closed — delivery is at-most-once
/// and a sink that cannot take a frame right now never gets it later.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The transport buffer is full — the client is too slow to keep up.
    #[error("sink buffer full")]
    Full,

    /// The transport is gone (client disconnected mid-broadcast).
    #[error("sink closed")]
    Closed,
}
