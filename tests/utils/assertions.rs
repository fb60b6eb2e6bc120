//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use coderoom::OutboundMessage;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    clients: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for specific clients
    pub fn for_clients(setup: &'a TestSetup, clients: Vec<&'a str>) -> Self {
        Self { setup, clients }
    }

    /// Assert that each client received exactly this message next (consumes it)
    pub async fn received(self, expected: OutboundMessage) {
        for client in &self.clients {
            let raw = self
                .setup
                .mock_conn_manager
                .consume_message_for(self.setup.client(client))
                .await;
            assert!(raw.is_some(), "{} should have received a message", client);

            let message: OutboundMessage = serde_json::from_str(&raw.unwrap()).unwrap();
            assert_eq!(message, expected, "{} received the wrong message", client);
        }
    }

    /// Assert that each client received a file announcement (consumes it) and
    /// return the announced URL
    pub async fn received_file(self, expected_name: &str) -> String {
        let mut urls = Vec::new();
        for client in &self.clients {
            let raw = self
                .setup
                .mock_conn_manager
                .consume_message_for(self.setup.client(client))
                .await
                .unwrap_or_else(|| panic!("{} should have received a file message", client));

            match serde_json::from_str::<OutboundMessage>(&raw).unwrap() {
                OutboundMessage::File {
                    file_name,
                    file_url,
                } => {
                    assert_eq!(file_name, expected_name);
                    urls.push(file_url);
                }
                other => panic!("{} received {:?} instead of a file message", client, other),
            }
        }

        urls.dedup();
        assert_eq!(urls.len(), 1, "clients were told different URLs");
        urls.remove(0)
    }

    /// Assert that clients have no pending messages
    pub async fn received_no_messages(self) {
        for client in &self.clients {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(self.setup.client(client))
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                client,
                messages
            );
        }
    }
}
