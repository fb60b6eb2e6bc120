use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument};

use super::store::AttachmentStore;

/// Configuration for the attachment sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to run the sweep
    pub sweep_interval: Duration,
    /// How old an attachment must be before deletion
    pub retention_window: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60 * 60),   // 1 hour
            retention_window: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

/// Starts the background task that periodically deletes expired attachments.
/// Never touches room state.
#[instrument(skip(store))]
pub async fn start_sweep_task(store: Arc<AttachmentStore>, config: SweepConfig) {
    info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        retention_window_secs = config.retention_window.as_secs(),
        upload_dir = %store.upload_dir().display(),
        "Starting attachment sweep background task"
    );

    let mut sweep_interval = interval(config.sweep_interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        sweep_interval.tick().await;
        run_sweep(&store, config.retention_window).await;
    }
}

async fn run_sweep(store: &AttachmentStore, retention_window: Duration) -> usize {
    info!("Running attachment sweep");

    match store.sweep(retention_window).await {
        Ok(deleted_count) => {
            info!(deleted_count, "Attachment sweep completed");
            deleted_count
        }
        Err(e) => {
            error!(error = %e, "Attachment sweep failed");
            0
        }
    }
}
