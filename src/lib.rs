// Library crate for the room relay server
// This file exposes the public API for integration tests

pub mod attachment;
pub mod config;
pub mod room;
pub mod routes;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use attachment::{Attachment, AttachmentStore};
pub use config::AppConfig;
pub use room::{ConnectionId, RoomCode, RoomRegistry};
pub use shared::{AppError, AppState};
pub use websockets::{BroadcastRelay, ConnectionManager, InboundMessage, OutboundMessage, RelayEvent};
