// Public API
pub use connection_manager::{ConnectionManager, DeliveryError, InMemoryConnectionManager};
pub use handler::websocket_handler;
pub use messages::{InboundMessage, OutboundMessage, RelayEvent};
pub use relay::BroadcastRelay;
pub use socket::{forward_outbound, inbound_events};

// Internal modules
mod connection_manager;
mod handler;
mod messages;
mod relay;
mod socket;
