use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::room::RoomCode;

/// A file made available to a room
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    /// Random on-disk name; the only part of the public URL that identifies the file
    pub storage_name: String,
    /// Name supplied by the uploader, for presentation only
    pub display_name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub room: RoomCode,
    pub public_url: String,
}

/// Response for a successful upload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_name: String,
    pub file_url: String,
}
