use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::connection_manager::ConnectionManager;
use super::messages::{InboundMessage, OutboundMessage, RelayEvent};
use crate::attachment::Attachment;
use crate::room::{ConnectionId, RoomCode, RoomRegistry};
use crate::shared::AppError;

/// Routes inbound events to the right subset of room members.
///
/// Membership is read from the registry on every event and the snapshot is
/// released before any message is queued, so a slow peer never holds a room
/// lock and never delays delivery to the others.
pub struct BroadcastRelay {
    registry: Arc<RoomRegistry>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl BroadcastRelay {
    pub fn new(registry: Arc<RoomRegistry>, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            registry,
            connection_manager,
        }
    }

    /// Consume a connection's event stream until it disconnects.
    /// The connection is always removed from its room afterwards.
    pub async fn run_connection<S>(&self, connection_id: ConnectionId, events: S)
    where
        S: Stream<Item = RelayEvent>,
    {
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            if event == RelayEvent::Disconnect {
                break;
            }
            self.handle_event(connection_id, event).await;
        }

        self.disconnect(connection_id).await;
    }

    pub async fn handle_event(&self, connection_id: ConnectionId, event: RelayEvent) {
        match event {
            RelayEvent::Message(InboundMessage::Join { room }) => {
                self.join(connection_id, room.as_deref());
            }
            RelayEvent::Message(InboundMessage::Text { text }) => {
                self.relay_text(connection_id, text).await;
            }
            RelayEvent::Message(InboundMessage::Unrecognized) => {
                warn!(%connection_id, "Unrecognized message type, dropping");
            }
            RelayEvent::Malformed { error } => {
                warn!(%connection_id, error = %error, "Failed to parse WebSocket message");
            }
            RelayEvent::Disconnect => self.disconnect(connection_id).await,
        }
    }

    /// Admit a connection to a room. Missing or invalid codes are ignored.
    pub fn join(&self, connection_id: ConnectionId, room: Option<&str>) -> Option<RoomCode> {
        let Some(code) = room.and_then(RoomCode::parse) else {
            debug!(%connection_id, requested = ?room, "Join without a usable room code, ignoring");
            return None;
        };

        self.registry.join(&code, connection_id);
        Some(code)
    }

    /// Deliver text to every other member of the sender's room.
    /// Returns how many members it was queued for.
    #[instrument(skip(self, text))]
    pub async fn relay_text(&self, sender: ConnectionId, text: String) -> usize {
        let Some(room) = self.registry.room_of(sender) else {
            debug!(%sender, "Text from connection without a room, ignoring");
            return 0;
        };

        let targets: Vec<ConnectionId> = self
            .registry
            .members_of(&room)
            .into_iter()
            .filter(|member| *member != sender)
            .collect();

        self.deliver(&room, &targets, &OutboundMessage::Text { text })
            .await
    }

    /// Tell every member of the attachment's room, uploader included,
    /// that the file is available.
    #[instrument(skip(self, attachment), fields(room = %attachment.room, storage_name = %attachment.storage_name))]
    pub async fn announce_file(&self, attachment: &Attachment) -> Result<usize, AppError> {
        if !self.registry.contains(&attachment.room) {
            warn!("Attachment announced for a room that no longer exists");
            return Err(AppError::InvalidRoom);
        }

        let targets = self.registry.members_of(&attachment.room);
        let message = OutboundMessage::File {
            file_name: attachment.display_name.clone(),
            file_url: attachment.public_url.clone(),
        };

        Ok(self.deliver(&attachment.room, &targets, &message).await)
    }

    /// Remove a connection from its room and drop its outbound channel
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let room = self.registry.leave(connection_id);
        self.connection_manager
            .remove_connection(connection_id)
            .await;

        info!(%connection_id, room = ?room.as_ref().map(RoomCode::as_str), "Connection disconnected");
    }

    async fn deliver(
        &self,
        room: &RoomCode,
        targets: &[ConnectionId],
        message: &OutboundMessage,
    ) -> usize {
        let message_json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                error!(room = %room, error = %e, "Failed to serialize outbound message");
                return 0;
            }
        };

        let mut delivered = 0;
        for target in targets {
            match self
                .connection_manager
                .send_to_connection(*target, &message_json)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(room = %room, connection_id = %target, error = %e, "Skipping undeliverable target");
                }
            }
        }

        debug!(room = %room, targets = targets.len(), delivered, "Fan-out complete");
        delivered
    }
}
