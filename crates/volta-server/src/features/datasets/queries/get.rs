//! Get dataset metadata query

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;
use crate::features::shared::validation::access_level_label;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDatasetQuery {
    pub dataset_id: Uuid,
    pub requested_by: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDatasetResponse {
    pub id: Uuid,
    pub lineage_id: Uuid,
    pub version: i32,
    pub file_name: String,
    pub file_size: i64,
    pub checksum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrode_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    pub access_level: String,
    pub delimiter: String,
    pub downloads_count: i64,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetDatasetError {
    #[error("Dataset '{0}' not found")]
    NotFound(Uuid),
    #[error("Access denied: This dataset is private")]
    AccessDenied,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<GetDatasetResponse, GetDatasetError>> for GetDatasetQuery {}

impl crate::cqrs::middleware::Query for GetDatasetQuery {}

#[tracing::instrument(skip(pool, query), fields(dataset_id = %query.dataset_id))]
pub async fn handle(
    pool: PgPool,
    query: GetDatasetQuery,
) -> Result<GetDatasetResponse, GetDatasetError> {
    let dataset = super::super::fetch_dataset(&pool, query.dataset_id)
        .await?
        .ok_or(GetDatasetError::NotFound(query.dataset_id))?;

    let access = dataset.resolve_access(&pool, &query.requested_by).await?;
    if !access.can_read() {
        return Err(GetDatasetError::AccessDenied);
    }

    Ok(GetDatasetResponse {
        id: dataset.id,
        lineage_id: dataset.lineage_id,
        version: dataset.version,
        file_size: dataset.content.len() as i64,
        file_name: dataset.file_name,
        checksum: dataset.checksum,
        description: dataset.description,
        changes: dataset.changes,
        data_type: dataset.data_type,
        category: dataset.category_id,
        project: dataset.project_id,
        method: dataset.method,
        electrode_type: dataset.electrode_type,
        instrument: dataset.instrument,
        access_level: access_level_label(dataset.is_public).to_string(),
        delimiter: dataset.delimiter,
        downloads_count: dataset.downloads_count,
        uploaded_by: dataset.uploaded_by,
        uploaded_at: dataset.uploaded_at,
    })
}
