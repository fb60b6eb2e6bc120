// Public API - what other modules can use
pub use cleanup_task::{start_sweep_task, SweepConfig};
pub use handlers::upload;
pub use models::{Attachment, UploadResponse};
pub use store::AttachmentStore;

// Internal modules
mod cleanup_task;
mod handlers;
pub mod models;
mod store;
