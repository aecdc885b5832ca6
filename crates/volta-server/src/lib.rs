//! Volta Server Library
//!
//! HTTP server for the volta research-data-sharing platform.
//!
//! # Overview
//!
//! The volta server provides a REST API for sharing electrochemistry
//! datasets:
//!
//! - **Dataset ingestion**: multipart uploads stored inline as UTF-8 text
//!   with append-only version chains
//! - **Format conversion**: delimiter-aware export as CSV, TSV, custom
//!   delimited text, or a spreadsheet workbook
//! - **Access control**: a pure decision gate over dataset visibility,
//!   ownership, and research-project collaborator roles
//! - **Research projects**: collaborative groupings with role-based
//!   membership
//!
//! # Architecture
//!
//! The server follows a **CQRS (Command Query Responsibility Segregation)**
//! architecture:
//!
//! - **Commands** (write operations): upload a dataset, create a version,
//!   create a project, manage collaborators. Executed via POST/PUT/DELETE.
//! - **Queries** (read operations): download/export, dataset and project
//!   listings, version history. Executed via GET.
//!
//! Each feature is a vertical slice under [`features`] with its own
//! commands, queries, and routes.
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework (multipart uploads, typed extractors)
//! - **SQLx**: PostgreSQL access and migrations
//! - **Tower**: middleware and service abstractions
//!
//! # Example
//!
//! ```no_run
//! use volta_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod tabular;

// Re-export commonly used types
pub use error::{AppError, AppResult};
