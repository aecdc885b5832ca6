//! Project read operations

pub mod get;
pub mod list;

pub use get::{GetProjectError, GetProjectQuery, GetProjectResponse};
pub use list::{ListProjectsError, ListProjectsParams, ListProjectsQuery, ProjectSummary};
