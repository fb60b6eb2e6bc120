use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::attachment;
use crate::room;
use crate::shared::AppState;
use crate::websockets;

// Room for multipart boundaries and the `room` field on top of the file itself
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Build the HTTP surface: room creation, uploads, the WebSocket endpoint,
/// attachment downloads and the static client
pub fn router(app_state: AppState) -> Router {
    let config = app_state.config.clone();
    let body_limit = usize::try_from(config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/create-room", get(room::create_room))
        .route(
            "/api/upload",
            post(attachment::upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/ws", get(websockets::websocket_handler))
        .nest_service(&config.public_prefix, ServeDir::new(&config.upload_dir))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
