use serde::{Deserialize, Serialize};

/// Client -> Server envelope, tagged by its `type` field
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundMessage {
    Join {
        #[serde(default)]
        room: Option<String>,
    },
    Text {
        text: String,
    },
    /// Any `type` this server does not know about
    #[serde(other)]
    Unrecognized,
}

/// Server -> Client envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(rename = "fileUrl")]
        file_url: String,
    },
}

/// One item of a connection's inbound event stream
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Message(InboundMessage),
    /// Frame that could not be parsed as an envelope
    Malformed { error: String },
    /// Terminates the stream; emitted once when the connection closes
    Disconnect,
}

impl RelayEvent {
    pub fn parse(raw: &[u8]) -> Self {
        match serde_json::from_slice::<InboundMessage>(raw) {
            Ok(message) => RelayEvent::Message(message),
            Err(e) => RelayEvent::Malformed {
                error: e.to_string(),
            },
        }
    }
}
