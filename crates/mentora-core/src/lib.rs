pub mod config;
pub mod error;
pub mod event;

pub use error::ConfigError;
pub use event::{Event, EventType, RoomId};
