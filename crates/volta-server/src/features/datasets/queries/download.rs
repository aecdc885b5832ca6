//! Download/export dataset query
//!
//! Converts stored content to the requested output format and counts the
//! download. The counter advances only after a successful conversion, so a
//! failed export is never recorded as a consumed download.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;
use crate::tabular::{self, OutputFormat, Table, TableError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadDatasetQuery {
    pub dataset_id: Uuid,
    pub requested_by: Principal,
    /// Requested output format: csv, tsv, txt, or xlsx
    pub format: String,
    /// Output delimiter, used only when format is txt
    pub delimiter: String,
}

/// Converted file payload ready to stream back to the client
#[derive(Debug, Clone)]
pub struct DownloadPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadDatasetError {
    #[error("Dataset is required")]
    DatasetRequired,
    #[error("Invalid dataset id: {0}")]
    InvalidDatasetId(String),
    #[error("Invalid format")]
    InvalidFormat,
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(String),
    #[error("Dataset '{0}' not found")]
    NotFound(Uuid),
    #[error("File content not found")]
    ContentNotFound,
    #[error("Access denied: This dataset is private")]
    AccessDenied,
    #[error("{0}")]
    Conversion(#[from] TableError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DownloadPayload, DownloadDatasetError>> for DownloadDatasetQuery {}

impl crate::cqrs::middleware::Query for DownloadDatasetQuery {}

impl DownloadDatasetQuery {
    /// Resolve the requested format, validating the output delimiter for
    /// plain-text exports.
    pub fn output_format(&self) -> Result<OutputFormat, DownloadDatasetError> {
        match self.format.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "txt" => {
                let delimiter = tabular::delimiter_byte(&self.delimiter)
                    .map_err(|_| DownloadDatasetError::InvalidDelimiter(self.delimiter.clone()))?;
                Ok(OutputFormat::Text { delimiter })
            },
            "xlsx" => Ok(OutputFormat::Workbook),
            _ => Err(DownloadDatasetError::InvalidFormat),
        }
    }
}

#[tracing::instrument(skip(pool, query), fields(dataset_id = %query.dataset_id, format = %query.format))]
pub async fn handle(
    pool: PgPool,
    query: DownloadDatasetQuery,
) -> Result<DownloadPayload, DownloadDatasetError> {
    let format = query.output_format()?;

    let dataset = super::super::fetch_dataset(&pool, query.dataset_id)
        .await?
        .ok_or(DownloadDatasetError::NotFound(query.dataset_id))?;

    let access = dataset.resolve_access(&pool, &query.requested_by).await?;
    if !access.can_read() {
        return Err(DownloadDatasetError::AccessDenied);
    }

    if dataset.content.is_empty() {
        return Err(DownloadDatasetError::ContentNotFound);
    }

    let source_delimiter = tabular::delimiter_byte(&dataset.delimiter)
        .map_err(DownloadDatasetError::Conversion)?;
    let table = Table::parse(&dataset.content, source_delimiter)?;
    let bytes = table.encode(&format)?;

    // Count the download only once the conversion has succeeded
    sqlx::query("UPDATE datasets SET downloads_count = downloads_count + 1 WHERE id = $1")
        .bind(dataset.id)
        .execute(&pool)
        .await?;

    tracing::debug!(
        dataset_id = %dataset.id,
        size = bytes.len(),
        "Dataset exported"
    );

    Ok(DownloadPayload {
        bytes,
        content_type: format.content_type(),
        file_name: format!("{}.{}", dataset.file_name, format.extension()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::datasets::commands::upload::{self, UploadDatasetCommand};

    fn query(dataset_id: Uuid, principal: Principal, format: &str) -> DownloadDatasetQuery {
        DownloadDatasetQuery {
            dataset_id,
            requested_by: principal,
            format: format.to_string(),
            delimiter: ",".to_string(),
        }
    }

    async fn seed(pool: &PgPool, owner: Uuid, is_public: bool, content: &[u8]) -> Uuid {
        let command = UploadDatasetCommand {
            uploaded_by: owner,
            file_name: "scan".to_string(),
            content: content.to_vec(),
            data_type: Some("cyclic_voltammetry".to_string()),
            description: None,
            access_level: if is_public { "public" } else { "private" }.to_string(),
            category: None,
            project: None,
            method: None,
            electrode_type: None,
            instrument: None,
            delimiter: ",".to_string(),
        };
        upload::handle(pool.clone(), command).await.unwrap().id
    }

    #[test]
    fn test_output_format_parsing() {
        let q = query(Uuid::new_v4(), Principal::Anonymous, "csv");
        assert_eq!(q.output_format().unwrap(), OutputFormat::Csv);

        let q = query(Uuid::new_v4(), Principal::Anonymous, "tsv");
        assert_eq!(q.output_format().unwrap(), OutputFormat::Tsv);

        let mut q = query(Uuid::new_v4(), Principal::Anonymous, "txt");
        q.delimiter = "|".to_string();
        assert_eq!(q.output_format().unwrap(), OutputFormat::Text { delimiter: b'|' });

        let q = query(Uuid::new_v4(), Principal::Anonymous, "xlsx");
        assert_eq!(q.output_format().unwrap(), OutputFormat::Workbook);

        let q = query(Uuid::new_v4(), Principal::Anonymous, "pdf");
        assert!(matches!(q.output_format(), Err(DownloadDatasetError::InvalidFormat)));
    }

    #[test]
    fn test_output_format_rejects_bad_txt_delimiter() {
        let mut q = query(Uuid::new_v4(), Principal::Anonymous, "txt");
        q.delimiter = "||".to_string();
        assert!(matches!(q.output_format(), Err(DownloadDatasetError::InvalidDelimiter(_))));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_converts_to_tsv(pool: PgPool) -> sqlx::Result<()> {
        let owner = Uuid::new_v4();
        let id = seed(&pool, owner, false, b"a,b\n1,2\n3,4").await;

        let payload = handle(pool.clone(), query(id, Principal::user(owner), "tsv"))
            .await
            .unwrap();
        assert_eq!(String::from_utf8(payload.bytes).unwrap(), "a\tb\n1\t2\n3\t4\n");
        assert_eq!(payload.content_type, "text/tab-separated-values");
        assert_eq!(payload.file_name, "scan.tsv");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_counts_successful_download(pool: PgPool) -> sqlx::Result<()> {
        let owner = Uuid::new_v4();
        let id = seed(&pool, owner, false, b"a,b\n1,2\n").await;

        handle(pool.clone(), query(id, Principal::user(owner), "csv"))
            .await
            .unwrap();
        handle(pool.clone(), query(id, Principal::user(owner), "csv"))
            .await
            .unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT downloads_count FROM datasets WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(count, 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_failed_conversion_not_counted(pool: PgPool) -> sqlx::Result<()> {
        let owner = Uuid::new_v4();
        // Ragged table: conversion must fail and the counter must not move
        let id = seed(&pool, owner, false, b"a,b\n1,2,3\n").await;

        let result = handle(pool.clone(), query(id, Principal::user(owner), "csv")).await;
        assert!(matches!(result, Err(DownloadDatasetError::Conversion(_))));

        let count: i64 =
            sqlx::query_scalar("SELECT downloads_count FROM datasets WHERE id = $1")
                .bind(id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(count, 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_anonymous_private_denied(pool: PgPool) -> sqlx::Result<()> {
        let id = seed(&pool, Uuid::new_v4(), false, b"a,b\n1,2\n").await;
        let result = handle(pool.clone(), query(id, Principal::Anonymous, "csv")).await;
        assert!(matches!(result, Err(DownloadDatasetError::AccessDenied)));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_anonymous_public_allowed(pool: PgPool) -> sqlx::Result<()> {
        let id = seed(&pool, Uuid::new_v4(), true, b"a,b\n1,2\n").await;
        let payload = handle(pool.clone(), query(id, Principal::Anonymous, "csv"))
            .await
            .unwrap();
        assert_eq!(String::from_utf8(payload.bytes).unwrap(), "a,b\n1,2\n");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_unknown_dataset_is_not_found(pool: PgPool) -> sqlx::Result<()> {
        let result = handle(
            pool.clone(),
            query(Uuid::new_v4(), Principal::Anonymous, "csv"),
        )
        .await;
        assert!(matches!(result, Err(DownloadDatasetError::NotFound(_))));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_empty_content_is_missing(pool: PgPool) -> sqlx::Result<()> {
        let owner = Uuid::new_v4();
        let id = seed(&pool, owner, false, b"").await;
        let result = handle(pool.clone(), query(id, Principal::user(owner), "csv")).await;
        assert!(matches!(result, Err(DownloadDatasetError::ContentNotFound)));
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_workbook_export(pool: PgPool) -> sqlx::Result<()> {
        let owner = Uuid::new_v4();
        let id = seed(&pool, owner, false, b"a,b\n1,2\n").await;
        let payload = handle(pool.clone(), query(id, Principal::user(owner), "xlsx"))
            .await
            .unwrap();
        assert_eq!(payload.file_name, "scan.xlsx");
        // xlsx payloads are zip archives
        assert_eq!(&payload.bytes[..2], b"PK");
        Ok(())
    }
}
