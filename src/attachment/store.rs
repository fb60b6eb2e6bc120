use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::models::Attachment;
use crate::room::RoomCode;
use crate::shared::AppError;

// Collisions of v4 names are practically impossible; this only bounds the loop
const MAX_NAME_ATTEMPTS: usize = 4;

/// Disk-backed store for room attachments.
///
/// Files are written once under a random name and never modified; the only
/// mutation after that is deletion by `sweep`. Readers (the static file
/// server) may race a deletion, in which case a read that already opened the
/// file still completes.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    upload_dir: PathBuf,
    public_prefix: String,
}

impl AttachmentStore {
    pub fn new(upload_dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_prefix: public_prefix.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create upload directory {}: {e}",
                self.upload_dir.display()
            ))
        })
    }

    pub fn path_for(&self, storage_name: &str) -> PathBuf {
        self.upload_dir.join(storage_name)
    }

    pub fn public_url(&self, storage_name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), storage_name)
    }

    /// Persist an upload under a fresh storage name.
    ///
    /// Nothing is written when `bytes` exceeds `size_limit`. The file is
    /// flushed before returning so the reference is immediately fetchable.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store(
        &self,
        room: RoomCode,
        display_name: &str,
        bytes: &[u8],
        size_limit: u64,
    ) -> Result<Attachment, AppError> {
        let size = bytes.len() as u64;
        if size > size_limit {
            warn!(size, size_limit, "Upload rejected, too large");
            return Err(AppError::PayloadTooLarge { limit: size_limit });
        }

        self.ensure_dir().await?;

        let (storage_name, mut file) = self.create_unique_file().await?;
        let path = self.path_for(&storage_name);

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&path).await {
                warn!(storage_name = %storage_name, error = %cleanup, "Failed to remove partial upload");
            }
            return Err(AppError::Storage(format!("Failed to write upload: {e}")));
        }

        info!(room = %room, storage_name = %storage_name, size, "Attachment stored");

        Ok(Attachment {
            public_url: self.public_url(&storage_name),
            storage_name,
            display_name: presentable_name(display_name),
            size,
            created_at: Utc::now(),
            room,
        })
    }

    async fn create_unique_file(&self) -> Result<(String, fs::File), AppError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let storage_name = Uuid::new_v4().simple().to_string();
            let opened = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_for(&storage_name))
                .await;

            match opened {
                Ok(file) => return Ok((storage_name, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(storage_name = %storage_name, "Storage name taken, retrying");
                }
                Err(e) => {
                    return Err(AppError::Storage(format!("Failed to create upload file: {e}")));
                }
            }
        }

        Err(AppError::Storage(
            "Could not allocate a unique storage name".to_string(),
        ))
    }

    /// Delete a single attachment; a file that is already gone is not an error
    pub async fn remove(&self, storage_name: &str) -> Result<(), AppError> {
        match fs::remove_file(self.path_for(storage_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every attachment older than `retention`, returning how many went
    pub async fn sweep(&self, retention: Duration) -> Result<usize, AppError> {
        self.sweep_at(retention, SystemTime::now()).await
    }

    /// Sweep as if the current time were `now`.
    ///
    /// Age is `now - last modified`. Failing to inspect or delete one entry is
    /// logged and skipped; only an unreadable upload directory fails the sweep.
    #[instrument(skip(self))]
    pub async fn sweep_at(&self, retention: Duration, now: SystemTime) -> Result<usize, AppError> {
        let mut entries = fs::read_dir(&self.upload_dir).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to read upload directory {}: {e}",
                self.upload_dir.display()
            ))
        })?;

        let mut paths = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => paths.push(entry.path()),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to list upload directory, sweeping what was listed");
                    break;
                }
            }
        }

        Ok(self.sweep_paths(&paths, retention, now).await)
    }

    async fn sweep_paths(&self, paths: &[PathBuf], retention: Duration, now: SystemTime) -> usize {
        let mut removed = 0;
        for path in paths {
            if self.sweep_entry(path, retention, now).await {
                removed += 1;
            }
        }
        removed
    }

    /// Delete `path` if it is a regular file older than `retention`.
    /// Returns whether this call removed it; errors are logged, never raised.
    async fn sweep_entry(&self, path: &Path, retention: Duration, now: SystemTime) -> bool {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(file = %file_name, "File already gone");
                return false;
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "Failed to get stats");
                return false;
            }
        };
        if !metadata.is_file() {
            return false;
        }
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                warn!(file = %file_name, error = %e, "Failed to read modification time");
                return false;
            }
        };

        // Clock skew can put mtime in the future; treat that as brand new
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= retention {
            return false;
        }

        match fs::remove_file(path).await {
            Ok(()) => {
                info!(file = %file_name, age_secs = age.as_secs(), "Deleted old file");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(file = %file_name, "File already gone");
                false
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "Failed to delete");
                false
            }
        }
    }
}

/// Reduce an uploader-supplied name to its final path segment
fn presentable_name(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if name.is_empty() {
        "file".to_string()
    } else {
        name.to_string()
    }
}
