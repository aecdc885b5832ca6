//! Create dataset version command
//!
//! Appends a new version to a dataset's lineage. The new row copies every
//! metadata field of the addressed version, bumps the version number, and
//! carries the new content; the addressed row is never modified.
//!
//! Two callers racing on the same lineage may both succeed and record the
//! same version number; the chain itself stays append-only.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVersionCommand {
    pub dataset_id: Uuid,
    pub requested_by: Principal,
    pub file_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVersionResponse {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateVersionError {
    #[error("Dataset '{0}' not found")]
    NotFound(Uuid),
    #[error("Access denied: you do not have write access to this dataset")]
    AccessDenied,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<CreateVersionResponse, CreateVersionError>> for CreateVersionCommand {}

impl crate::cqrs::middleware::Command for CreateVersionCommand {}

/// Handles the create version command
///
/// Requires read-write access on the addressed dataset. The inserted row
/// duplicates the dataset's metadata with `version = existing.version + 1`.
#[tracing::instrument(skip(pool, command), fields(dataset_id = %command.dataset_id))]
pub async fn handle(
    pool: PgPool,
    command: CreateVersionCommand,
) -> Result<CreateVersionResponse, CreateVersionError> {
    let existing = super::super::fetch_dataset(&pool, command.dataset_id)
        .await?
        .ok_or(CreateVersionError::NotFound(command.dataset_id))?;

    let access = existing.resolve_access(&pool, &command.requested_by).await?;
    if !access.can_write() {
        return Err(CreateVersionError::AccessDenied);
    }

    let checksum = volta_common::checksum::sha256_hex(command.file_content.as_bytes());

    let (id, uploaded_at) = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        r#"
        INSERT INTO datasets (
            lineage_id, version, file_name, content, checksum, description,
            changes, uploaded_by, data_type, category_id, project_id, method,
            electrode_type, instrument, is_public, delimiter
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        RETURNING id, uploaded_at
        "#,
    )
    .bind(existing.lineage_id)
    .bind(existing.version + 1)
    .bind(&existing.file_name)
    .bind(&command.file_content)
    .bind(&checksum)
    .bind(&existing.description)
    .bind(&command.changes)
    .bind(existing.uploaded_by)
    .bind(&existing.data_type)
    .bind(existing.category_id)
    .bind(existing.project_id)
    .bind(&existing.method)
    .bind(&existing.electrode_type)
    .bind(&existing.instrument)
    .bind(existing.is_public)
    .bind(&existing.delimiter)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        dataset_id = %command.dataset_id,
        new_id = %id,
        version = existing.version + 1,
        "New dataset version created"
    );

    Ok(CreateVersionResponse {
        id,
        file_name: existing.file_name,
        uploaded_at,
        version: existing.version + 1,
    })
}
