use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};

use super::models::UploadResponse;
use crate::room::RoomCode;
use crate::shared::{AppError, AppState};

/// HTTP handler for attachment uploads
///
/// POST /api/upload (multipart: `room` text field, `file` file field)
/// Stores the file, then announces it to every member of the room
#[instrument(name = "upload", skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let size_limit = state.config.max_upload_bytes;
    let mut room: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, size_limit))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "room" => {
                room = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, size_limit))?,
                );
            }
            "file" => {
                // Browsers send an empty, unnamed part when no file was picked
                let Some(display_name) = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                else {
                    continue;
                };

                let mut data = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, size_limit))?
                {
                    if (data.len() + chunk.len()) as u64 > size_limit {
                        warn!(size_limit, "Upload exceeded size limit while streaming");
                        return Err(AppError::PayloadTooLarge { limit: size_limit });
                    }
                    data.extend_from_slice(&chunk);
                }
                file = Some((display_name, data));
            }
            _ => {}
        }
    }

    let room = room
        .as_deref()
        .and_then(RoomCode::parse)
        .filter(|code| state.registry.contains(code))
        .ok_or(AppError::InvalidRoom)?;
    let (display_name, data) = file.ok_or(AppError::NoFile)?;

    // Write completes before the registry is consulted for the broadcast
    let attachment = state
        .attachment_store
        .store(room, &display_name, &data, size_limit)
        .await?;

    match state.relay.announce_file(&attachment).await {
        Ok(delivered) => {
            info!(
                room = %attachment.room,
                storage_name = %attachment.storage_name,
                delivered,
                "Attachment announced"
            );
        }
        Err(e) => {
            // Room emptied between validation and announcement
            if let Err(remove_err) = state.attachment_store.remove(&attachment.storage_name).await {
                warn!(error = %remove_err, "Failed to remove orphaned attachment");
            }
            return Err(e);
        }
    }

    Ok(Json(UploadResponse {
        success: true,
        file_name: attachment.display_name,
        file_url: attachment.public_url,
    }))
}

/// The request body limit surfaces as a multipart error; report it as a size violation
fn multipart_error(error: MultipartError, size_limit: u64) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(size_limit, "Upload body exceeded the request limit");
        AppError::PayloadTooLarge { limit: size_limit }
    } else {
        AppError::Multipart(error.to_string())
    }
}
