use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::attachment::AttachmentStore;
use crate::config::AppConfig;
use crate::room::RoomRegistry;
use crate::websockets::{BroadcastRelay, ConnectionManager};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<RoomRegistry>,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub relay: Arc<BroadcastRelay>,
    pub attachment_store: Arc<AttachmentStore>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        registry: Arc<RoomRegistry>,
        connection_manager: Arc<dyn ConnectionManager>,
        attachment_store: Arc<AttachmentStore>,
    ) -> Self {
        let relay = Arc::new(BroadcastRelay::new(
            Arc::clone(&registry),
            Arc::clone(&connection_manager),
        ));

        Self {
            config,
            registry,
            connection_manager,
            relay,
            attachment_store,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid or missing room code")]
    InvalidRoom,

    #[error("No file uploaded")]
    NoFile,

    #[error("File exceeds the {limit} byte upload limit")]
    PayloadTooLarge { limit: u64 },

    #[error("Could not generate a unique room code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Machine-readable reason code sent alongside the message
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::InvalidRoom => "invalid_room",
            AppError::NoFile => "no_file",
            AppError::PayloadTooLarge { .. } => "size_exceeded",
            AppError::CodeSpaceExhausted { .. } => "code_space_exhausted",
            AppError::Multipart(_) => "malformed_upload",
            AppError::Storage(_) => "storage",
            AppError::Configuration(_) => "configuration",
            AppError::Internal => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRoom | AppError::NoFile | AppError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::CodeSpaceExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) | AppError::Configuration(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
            "reason": self.reason(),
        }));

        (self.status(), body).into_response()
    }
}
