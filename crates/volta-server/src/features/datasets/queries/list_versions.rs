//! List dataset versions query
//!
//! Returns every record sharing the target dataset's lineage, ordered by
//! version ascending.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::super::types::VersionInfo;
use crate::features::shared::access::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListVersionsQuery {
    pub dataset_id: Uuid,
    pub requested_by: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListVersionsResponse {
    pub versions: Vec<VersionInfo>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListVersionsError {
    #[error("Dataset '{0}' not found")]
    NotFound(Uuid),
    #[error("Access denied: This dataset is private")]
    AccessDenied,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ListVersionsResponse, ListVersionsError>> for ListVersionsQuery {}

impl crate::cqrs::middleware::Query for ListVersionsQuery {}

#[tracing::instrument(skip(pool, query), fields(dataset_id = %query.dataset_id))]
pub async fn handle(
    pool: PgPool,
    query: ListVersionsQuery,
) -> Result<ListVersionsResponse, ListVersionsError> {
    let dataset = super::super::fetch_dataset(&pool, query.dataset_id)
        .await?
        .ok_or(ListVersionsError::NotFound(query.dataset_id))?;

    let access = dataset.resolve_access(&pool, &query.requested_by).await?;
    if !access.can_read() {
        return Err(ListVersionsError::AccessDenied);
    }

    let versions = sqlx::query_as::<_, (Uuid, i32, chrono::DateTime<chrono::Utc>, Uuid, Option<String>)>(
        r#"
        SELECT id, version, uploaded_at, uploaded_by, changes
        FROM datasets
        WHERE lineage_id = $1
        ORDER BY version ASC
        "#,
    )
    .bind(dataset.lineage_id)
    .fetch_all(&pool)
    .await?
    .into_iter()
    .map(|(id, version, uploaded_at, uploaded_by, changes)| VersionInfo {
        id,
        version,
        uploaded_at,
        uploaded_by,
        changes,
    })
    .collect();

    Ok(ListVersionsResponse { versions })
}
