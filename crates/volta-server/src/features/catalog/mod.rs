//! Reference-data catalog feature slice
//!
//! Serves the data types and publication-status categories offered by the
//! upload form. The catalog changes rarely, so responses carry a
//! Cache-Control header derived from configuration.

pub mod queries;
pub mod routes;

pub use routes::{catalog_routes, CatalogState};
