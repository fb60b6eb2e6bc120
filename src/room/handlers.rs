use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::types::CreateRoomResponse;
use crate::shared::{AppError, AppState};

/// HTTP handler for creating a new room
///
/// GET /api/create-room
/// Returns the freshly generated room code
#[instrument(name = "create_room", skip(state))]
pub async fn create_room(
    State(state): State<AppState>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    let code = state.registry.create_room()?;

    info!(room = %code, "Room code issued");

    Ok(Json(CreateRoomResponse {
        room_code: code.to_string(),
    }))
}
