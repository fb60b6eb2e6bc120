use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tracing::{info, instrument};

use super::socket::{forward_outbound, inbound_events};
use crate::room::ConnectionId;
use crate::shared::AppState;

/// WebSocket endpoint; rooms are chosen afterwards with a `join` message
///
/// GET /ws
#[instrument(name = "websocket_upgrade", skip_all)]
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: WebSocket, app_state: AppState) {
    let connection_id = ConnectionId::new();
    info!(%connection_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) =
        mpsc::channel::<String>(app_state.config.outbound_queue_capacity);
    app_state
        .connection_manager
        .add_connection(connection_id, outbound_sender)
        .await;

    let (sink, stream) = socket.split();
    let outbound_task = tokio::spawn(forward_outbound(sink, outbound_receiver));

    // Runs until the peer goes away; leaves the room and drops the sender on exit
    app_state
        .relay
        .run_connection(connection_id, inbound_events(stream))
        .await;

    outbound_task.abort();
    info!(%connection_id, "WebSocket connection closed");
}
