use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use super::queries::{
    list_categories, list_data_types, ListCategoriesError, ListCategoriesQuery,
    ListDataTypesError, ListDataTypesQuery,
};

/// State for catalog routes: the pool plus the configured cache lifetime
#[derive(Clone)]
pub struct CatalogState {
    pub db: PgPool,
    pub cache_ttl_secs: u64,
}

pub fn catalog_routes() -> Router<CatalogState> {
    Router::new()
        .route("/data-types", get(get_data_types))
        .route("/data-categories", get(get_data_categories))
}

#[tracing::instrument(skip(state))]
async fn get_data_types(State(state): State<CatalogState>) -> Result<Response, CatalogApiError> {
    let data_types = list_data_types::handle(state.db, ListDataTypesQuery::default()).await?;

    tracing::debug!(count = data_types.len(), "Data types listed via API");

    Ok(cached_ok(state.cache_ttl_secs, ApiResponse::success(data_types)))
}

#[tracing::instrument(skip(state))]
async fn get_data_categories(
    State(state): State<CatalogState>,
) -> Result<Response, CatalogApiError> {
    let categories = list_categories::handle(state.db, ListCategoriesQuery::default()).await?;

    tracing::debug!(count = categories.len(), "Data categories listed via API");

    Ok(cached_ok(state.cache_ttl_secs, ApiResponse::success(categories)))
}

/// 200 response with a Cache-Control header for the rarely-changing catalog
fn cached_ok<T: serde::Serialize>(ttl_secs: u64, body: ApiResponse<T>) -> Response {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, format!("public, max-age={}", ttl_secs))],
        Json(body),
    )
        .into_response()
}

#[derive(Debug)]
enum CatalogApiError {
    DataTypes(ListDataTypesError),
    Categories(ListCategoriesError),
}

impl From<ListDataTypesError> for CatalogApiError {
    fn from(err: ListDataTypesError) -> Self {
        Self::DataTypes(err)
    }
}

impl From<ListCategoriesError> for CatalogApiError {
    fn from(err: ListCategoriesError) -> Self {
        Self::Categories(err)
    }
}

impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        match self {
            CatalogApiError::DataTypes(ListDataTypesError::Database(ref e)) => {
                tracing::error!("Database error listing data types: {}", e);
            },
            CatalogApiError::Categories(ListCategoriesError::Database(ref e)) => {
                tracing::error!("Database error listing data categories: {}", e);
            },
        }
        let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
    }
}
