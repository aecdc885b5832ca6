//! Feature modules implementing the volta API
//!
//! All feature slices follow the CQRS (Command Query Responsibility
//! Segregation) pattern. Each feature is a vertical slice with its own
//! commands, queries, and routes.
//!
//! # Features
//!
//! - **catalog**: reference data served to the upload form (data types,
//!   publication-status categories)
//! - **datasets**: dataset ingestion, format-converting export, and
//!   append-only versioning
//! - **projects**: research project management and collaborator roles
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (upload, create, update, delete)
//! - `queries/` - Read operations (get, list, download)
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Shared types (if needed)
//!
//! Commands and queries implement the mediator pattern using the `mediator`
//! crate, enabling clean separation of concerns and easy testing.

pub mod catalog;
pub mod datasets;
pub mod projects;
pub mod shared;

use axum::Router;

use crate::config::Config;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
    /// Application configuration
    pub config: Config,
}

/// Creates the main API router with all feature routes mounted
///
/// Each feature is mounted under its own path prefix:
/// - `/datasets` - Dataset upload, listing, export, and versioning
/// - `/projects` - Research project and collaborator management
/// - `/data-types`, `/data-categories` - Reference data catalog
pub fn router(state: FeatureState) -> Router<()> {
    let catalog_state = catalog::CatalogState {
        db: state.db.clone(),
        cache_ttl_secs: state.config.catalog_cache_ttl_secs,
    };

    Router::new()
        .nest("/datasets", datasets::datasets_routes().with_state(state.db.clone()))
        .nest("/projects", projects::projects_routes().with_state(state.db.clone()))
        .merge(catalog::catalog_routes().with_state(catalog_state))
}
