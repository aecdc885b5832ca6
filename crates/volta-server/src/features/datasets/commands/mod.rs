//! Dataset write operations

pub mod new_version;
pub mod upload;

pub use new_version::{CreateVersionCommand, CreateVersionError, CreateVersionResponse};
pub use upload::{UploadDatasetCommand, UploadDatasetError, UploadDatasetResponse};
