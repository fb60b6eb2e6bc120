use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

use crate::room::ConnectionId;

/// Why a message could not be handed to a connection
#[derive(Debug, Error, PartialEq)]
pub enum DeliveryError {
    #[error("connection is not registered")]
    NotConnected,
    #[error("connection channel is closed")]
    ChannelClosed,
    #[error("connection outbound queue is full")]
    QueueFull,
}

/// Owns the outbound side of every live connection
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: ConnectionId, sender: mpsc::Sender<String>);

    async fn remove_connection(&self, connection_id: ConnectionId);

    /// Queue a message for one connection without waiting on the peer.
    /// A peer whose queue is full is skipped rather than waited on.
    async fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: &str,
    ) -> Result<(), DeliveryError>;
}

pub struct InMemoryConnectionManager {
    // connection id -> sender
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::Sender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: ConnectionId, sender: mpsc::Sender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        connections.remove(&connection_id);
    }

    async fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: &str,
    ) -> Result<(), DeliveryError> {
        let connections = self.connections.read().await;
        let sender = connections
            .get(&connection_id)
            .ok_or(DeliveryError::NotConnected)?;
        match sender.try_send(message.to_string()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(DeliveryError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DeliveryError::ChannelClosed),
        }
    }
}
