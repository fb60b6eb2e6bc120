#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::{mpsc, RwLock};

use coderoom::room::{RoomCode, RoomCodeGenerator};
use coderoom::websockets::{ConnectionManager, DeliveryError};
use coderoom::ConnectionId;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every message queued for each connection
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<ConnectionId, VecDeque<String>>>>,
    connected: Arc<RwLock<HashSet<ConnectionId>>>,
    unreachable: Arc<RwLock<HashSet<ConnectionId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
            connected: Arc::new(RwLock::new(HashSet::new())),
            unreachable: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub async fn add_connected(&self, connection_id: ConnectionId) {
        self.connected.write().await.insert(connection_id);
    }

    /// Make sends to this connection fail as if its channel had closed
    pub async fn mark_unreachable(&self, connection_id: ConnectionId) {
        self.unreachable.write().await.insert(connection_id);
    }

    pub async fn is_connected(&self, connection_id: ConnectionId) -> bool {
        self.connected.read().await.contains(&connection_id)
    }

    pub async fn get_messages_for(&self, connection_id: ConnectionId) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(&connection_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn consume_message_for(&self, connection_id: ConnectionId) -> Option<String> {
        self.sent_messages
            .write()
            .await
            .get_mut(&connection_id)
            .and_then(|queue| queue.pop_front())
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection_id: ConnectionId, _sender: mpsc::Sender<String>) {
        self.add_connected(connection_id).await;
    }

    async fn remove_connection(&self, connection_id: ConnectionId) {
        self.connected.write().await.remove(&connection_id);
    }

    async fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: &str,
    ) -> Result<(), DeliveryError> {
        if !self.connected.read().await.contains(&connection_id) {
            return Err(DeliveryError::NotConnected);
        }
        if self.unreachable.read().await.contains(&connection_id) {
            return Err(DeliveryError::ChannelClosed);
        }

        self.sent_messages
            .write()
            .await
            .entry(connection_id)
            .or_default()
            .push_back(message.to_string());
        Ok(())
    }
}

/// Code generator replaying a scripted list, then falling back to the last code
pub struct ScriptedCodeGenerator {
    codes: Mutex<VecDeque<String>>,
}

impl ScriptedCodeGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
        }
    }
}

impl RoomCodeGenerator for ScriptedCodeGenerator {
    fn generate(&self) -> RoomCode {
        let mut codes = self.codes.lock().unwrap();
        let next = if codes.len() > 1 {
            codes.pop_front().unwrap()
        } else {
            codes.front().cloned().unwrap()
        };
        RoomCode::parse(&next).unwrap()
    }
}
