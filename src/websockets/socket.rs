use axum::extract::ws::Message;
use futures::stream::{self, Stream, StreamExt};
use futures::{Sink, SinkExt};
use std::fmt::Display;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::messages::RelayEvent;

/// Adapts the inbound half of a WebSocket into a stream of relay events.
///
/// Text and binary frames are parsed as envelopes; ping/pong frames are
/// skipped. The stream always ends with exactly one `RelayEvent::Disconnect`,
/// whether the peer closed cleanly, the transport errored, or the underlying
/// stream simply ran out.
pub fn inbound_events<S, E>(frames: S) -> impl Stream<Item = RelayEvent> + Send
where
    S: Stream<Item = Result<Message, E>> + Unpin + Send,
    E: Display + Send,
{
    stream::unfold(Some(frames), |state| async move {
        let mut frames = state?;
        loop {
            match frames.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some((RelayEvent::parse(text.as_bytes()), Some(frames)));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Some((RelayEvent::parse(&data), Some(frames)));
                }
                Some(Ok(Message::Close(_))) | None => {
                    return Some((RelayEvent::Disconnect, None));
                }
                Some(Ok(_)) => continue, // ping/pong
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket receive failed");
                    return Some((RelayEvent::Disconnect, None));
                }
            }
        }
    })
}

/// Pumps queued outbound messages into the WebSocket until either side closes
pub async fn forward_outbound<S>(mut sink: S, mut outbound: mpsc::Receiver<String>)
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(message) = outbound.recv().await {
        if let Err(e) = sink.send(Message::Text(message)).await {
            debug!(error = %e, "WebSocket send failed, stopping outbound pump");
            break;
        }
    }
    let _ = sink.close().await;
}
