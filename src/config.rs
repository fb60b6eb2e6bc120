//! Runtime configuration.
//!
//! Values come from an optional `config/default.toml` followed by
//! environment variables prefixed with `CODEROOM_` (for example
//! `CODEROOM_PORT=8080` or `CODEROOM_RETENTION_WINDOW_MS=600000`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::attachment::SweepConfig;
use crate::shared::AppError;

const MIB: u64 = 1024 * 1024;
const ONE_HOUR_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Interface the HTTP server binds to
    pub host: String,
    pub port: u16,
    /// Directory attachments are written to and swept from
    pub upload_dir: PathBuf,
    /// Directory holding the browser client
    pub public_dir: PathBuf,
    /// URL prefix attachments are served under
    pub public_prefix: String,
    pub max_upload_bytes: u64,
    /// How old an attachment may get before the sweep deletes it
    pub retention_window_ms: u64,
    /// How often the sweep runs; independent of the retention window
    pub sweep_interval_ms: u64,
    /// Upper bound on room code generation retries
    pub max_code_attempts: usize,
    /// Messages buffered per connection before further ones are dropped for it
    pub outbound_queue_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            upload_dir: PathBuf::from("./uploads"),
            public_dir: PathBuf::from("./public"),
            public_prefix: "/uploads".to_string(),
            max_upload_bytes: 50 * MIB,
            retention_window_ms: ONE_HOUR_MS,
            sweep_interval_ms: ONE_HOUR_MS,
            max_code_attempts: 32,
            outbound_queue_capacity: 256,
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/default.toml` and `CODEROOM_*` env vars
    pub fn load() -> Result<Self, AppError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::Environment::with_prefix("CODEROOM").try_parsing(true))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build config: {e}")))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| AppError::Configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.sweep_interval_ms == 0 {
            return Err(AppError::Configuration(
                "sweep_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_code_attempts == 0 {
            return Err(AppError::Configuration(
                "max_code_attempts must be greater than zero".to_string(),
            ));
        }
        if self.outbound_queue_capacity == 0 {
            return Err(AppError::Configuration(
                "outbound_queue_capacity must be greater than zero".to_string(),
            ));
        }
        if !self.public_prefix.starts_with('/') {
            return Err(AppError::Configuration(
                "public_prefix must start with '/'".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            sweep_interval: Duration::from_millis(self.sweep_interval_ms),
            retention_window: Duration::from_millis(self.retention_window_ms),
        }
    }
}
