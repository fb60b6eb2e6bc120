// Public API - what other modules can use
pub use generators::{RandomCodeGenerator, RoomCodeGenerator};
pub use handlers::create_room;
pub use models::{ConnectionId, RoomCode};
pub use registry::RoomRegistry;

// Internal modules
mod generators;
mod handlers;
pub mod models;
pub mod registry;
pub mod types;
