//! HTTP API assembly
//!
//! Builds the axum router, wires the middleware stack, and runs the server
//! with graceful shutdown.

pub mod response;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::features;
use crate::middleware;

/// Application state shared across operational handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
}

/// Connect to the database, run migrations, and serve the API until
/// shutdown.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    let state = AppState { db: pool };
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        db: state.db.clone(),
        config: config.clone(),
    };

    let feature_routes = features::router(feature_state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .with_state(state)
        .nest("/api/v1", feature_routes)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Volta Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Get platform statistics
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let datasets_result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM datasets").fetch_one(&state.db);
    let projects_result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM research_projects").fetch_one(&state.db);
    let downloads_result = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(downloads_count), 0)::bigint FROM datasets",
    )
    .fetch_one(&state.db);

    let (datasets_res, projects_res, downloads_res) =
        tokio::join!(datasets_result, projects_result, downloads_result);

    match (datasets_res, projects_res, downloads_res) {
        (Ok(datasets), Ok(projects), Ok(downloads)) => (
            StatusCode::OK,
            Json(json!({
                "datasets": datasets,
                "projects": projects,
                "downloads": downloads
            })),
        )
            .into_response(),
        _ => {
            tracing::error!("Failed to fetch stats from database");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch statistics" })),
            )
                .into_response()
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
