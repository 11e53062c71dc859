pub mod broadcaster;
pub mod error;
pub mod presence;
pub mod registry;

pub use broadcaster::Broadcaster;
pub use error::SinkError;
pub use presence::{is_online, PresenceStatus};
pub use registry::{ConnectionId, ConnectionRegistry, EventSink};
