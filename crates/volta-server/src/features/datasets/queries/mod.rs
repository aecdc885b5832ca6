//! Dataset read operations

pub mod download;
pub mod get;
pub mod list;
pub mod list_versions;

pub use download::{DownloadDatasetError, DownloadDatasetQuery, DownloadPayload};
pub use get::{GetDatasetError, GetDatasetQuery, GetDatasetResponse};
pub use list::{ListDatasetsError, ListDatasetsParams, ListDatasetsQuery};
pub use list_versions::{ListVersionsError, ListVersionsQuery, ListVersionsResponse};
