//! Upload dataset command
//!
//! Ingests one uploaded file as a version-1 dataset record. File content is
//! decoded as UTF-8 and stored inline; the declared data type must reference
//! an existing data type record.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{
    access_level_label, parse_access_level, validate_name, NameValidationError,
};
use crate::tabular;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDatasetCommand {
    pub uploaded_by: Uuid,
    pub file_name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "public" or "private"
    pub access_level: String,
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
    pub delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDatasetResponse {
    pub message: String,
    pub id: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub access_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrode_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    pub version: i32,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadDatasetError {
    #[error("No file provided")]
    FileRequired,
    #[error("File name is required and cannot be empty")]
    FileNameRequired,
    #[error("File name must not exceed 255 characters")]
    FileNameLength,
    #[error("File content is not valid UTF-8: {0}")]
    InvalidEncoding(String),
    #[error("Data type is required")]
    DataTypeRequired,
    #[error("Invalid data type")]
    InvalidDataType,
    #[error("Invalid category")]
    InvalidCategory,
    #[error("{0}")]
    InvalidAccessLevel(String),
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(String),
    #[error("Research project '{0}' not found")]
    ProjectNotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<UploadDatasetResponse, UploadDatasetError>> for UploadDatasetCommand {}

impl crate::cqrs::middleware::Command for UploadDatasetCommand {}

impl UploadDatasetCommand {
    pub fn validate(&self) -> Result<(), UploadDatasetError> {
        validate_name(&self.file_name, "File name", 255).map_err(|e| match e {
            NameValidationError::Required { .. } => UploadDatasetError::FileNameRequired,
            NameValidationError::TooLong { .. } => UploadDatasetError::FileNameLength,
        })?;

        match self.data_type.as_deref() {
            None | Some("") => return Err(UploadDatasetError::DataTypeRequired),
            Some(_) => {},
        }

        parse_access_level(&self.access_level).map_err(UploadDatasetError::InvalidAccessLevel)?;

        tabular::delimiter_byte(&self.delimiter)
            .map_err(|_| UploadDatasetError::InvalidDelimiter(self.delimiter.clone()))?;

        Ok(())
    }
}

/// Handles the upload dataset command
///
/// Validates referenced records, decodes the content as UTF-8, and inserts
/// the version-1 row. The new row's id doubles as its lineage id.
#[tracing::instrument(skip(pool, command), fields(file_name = %command.file_name, uploaded_by = %command.uploaded_by))]
pub async fn handle(
    pool: PgPool,
    command: UploadDatasetCommand,
) -> Result<UploadDatasetResponse, UploadDatasetError> {
    command.validate()?;

    let content = String::from_utf8(command.content.clone())
        .map_err(|e| UploadDatasetError::InvalidEncoding(e.to_string()))?;
    let file_size = content.len() as i64;

    // validate() guarantees the data type is present
    let data_type = command.data_type.clone().ok_or(UploadDatasetError::DataTypeRequired)?;
    let is_public = parse_access_level(&command.access_level)
        .map_err(UploadDatasetError::InvalidAccessLevel)?;

    let data_type_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM data_types WHERE id = $1)",
    )
    .bind(&data_type)
    .fetch_one(&pool)
    .await?;
    if !data_type_exists {
        return Err(UploadDatasetError::InvalidDataType);
    }

    if let Some(category) = command.category {
        let category_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM data_categories WHERE id = $1)",
        )
        .bind(category)
        .fetch_one(&pool)
        .await?;
        if !category_exists {
            return Err(UploadDatasetError::InvalidCategory);
        }
    }

    if let Some(project) = command.project {
        let project_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM research_projects WHERE id = $1)",
        )
        .bind(project)
        .fetch_one(&pool)
        .await?;
        if !project_exists {
            return Err(UploadDatasetError::ProjectNotFound(project));
        }
    }

    let id = Uuid::new_v4();
    let checksum = volta_common::checksum::sha256_hex(content.as_bytes());

    let uploaded_at = sqlx::query_scalar::<_, DateTime<Utc>>(
        r#"
        INSERT INTO datasets (
            id, lineage_id, version, file_name, content, checksum, description,
            uploaded_by, data_type, category_id, project_id, method,
            electrode_type, instrument, is_public, delimiter
        )
        VALUES ($1, $1, 1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING uploaded_at
        "#,
    )
    .bind(id)
    .bind(&command.file_name)
    .bind(&content)
    .bind(&checksum)
    .bind(&command.description)
    .bind(command.uploaded_by)
    .bind(&data_type)
    .bind(command.category)
    .bind(command.project)
    .bind(&command.method)
    .bind(&command.electrode_type)
    .bind(&command.instrument)
    .bind(is_public)
    .bind(&command.delimiter)
    .fetch_one(&pool)
    .await?;

    Ok(UploadDatasetResponse {
        message: "File uploaded successfully".to_string(),
        id,
        file_name: command.file_name,
        file_size,
        data_type,
        description: command.description,
        access_level: access_level_label(is_public).to_string(),
        category: command.category,
        method: command.method,
        electrode_type: command.electrode_type,
        instrument: command.instrument,
        version: 1,
        uploaded_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> UploadDatasetCommand {
        UploadDatasetCommand {
            uploaded_by: Uuid::new_v4(),
            file_name: "ferrocene_cv.csv".to_string(),
            content: b"potential,current\n0.1,0.002\n".to_vec(),
            data_type: Some("cyclic_voltammetry".to_string()),
            description: Some("Ferrocene redox couple".to_string()),
            access_level: "private".to_string(),
            category: None,
            project: None,
            method: Some("Cyclic".to_string()),
            electrode_type: Some("Glassy carbon".to_string()),
            instrument: Some("PalmSens4".to_string()),
            delimiter: ",".to_string(),
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_file_name() {
        let mut cmd = command();
        cmd.file_name = "".to_string();
        assert!(matches!(cmd.validate(), Err(UploadDatasetError::FileNameRequired)));
    }

    #[test]
    fn test_validation_file_name_too_long() {
        let mut cmd = command();
        cmd.file_name = "a".repeat(256);
        assert!(matches!(cmd.validate(), Err(UploadDatasetError::FileNameLength)));
    }

    #[test]
    fn test_validation_missing_data_type() {
        let mut cmd = command();
        cmd.data_type = None;
        assert!(matches!(cmd.validate(), Err(UploadDatasetError::DataTypeRequired)));
    }

    #[test]
    fn test_validation_bad_access_level() {
        let mut cmd = command();
        cmd.access_level = "restricted".to_string();
        assert!(matches!(cmd.validate(), Err(UploadDatasetError::InvalidAccessLevel(_))));
    }

    #[test]
    fn test_validation_bad_delimiter() {
        let mut cmd = command();
        cmd.delimiter = ";;".to_string();
        assert!(matches!(cmd.validate(), Err(UploadDatasetError::InvalidDelimiter(_))));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_creates_version_one(pool: PgPool) -> sqlx::Result<()> {
        let result = handle(pool.clone(), command()).await;
        assert!(result.is_ok());
        let response = result.unwrap();
        assert_eq!(response.version, 1);
        assert_eq!(response.file_size, 28);
        assert_eq!(response.access_level, "private");

        let (lineage_id, version): (Uuid, i32) = sqlx::query_as(
            "SELECT lineage_id, version FROM datasets WHERE id = $1",
        )
        .bind(response.id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(lineage_id, response.id);
        assert_eq!(version, 1);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_unknown_data_type(pool: PgPool) -> sqlx::Result<()> {
        let mut cmd = command();
        cmd.data_type = Some("nonexistent-id".to_string());
        let result = handle(pool.clone(), cmd).await;
        assert!(matches!(result, Err(UploadDatasetError::InvalidDataType)));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_unknown_category(pool: PgPool) -> sqlx::Result<()> {
        let mut cmd = command();
        cmd.category = Some(Uuid::new_v4());
        let result = handle(pool.clone(), cmd).await;
        assert!(matches!(result, Err(UploadDatasetError::InvalidCategory)));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_non_utf8_content(pool: PgPool) -> sqlx::Result<()> {
        let mut cmd = command();
        cmd.content = vec![0xff, 0xfe, 0x00];
        let result = handle(pool.clone(), cmd).await;
        assert!(matches!(result, Err(UploadDatasetError::InvalidEncoding(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_empty_content_is_valid(pool: PgPool) -> sqlx::Result<()> {
        let mut cmd = command();
        cmd.content = Vec::new();
        let result = handle(pool.clone(), cmd).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().file_size, 0);
        Ok(())
    }
}
