//! List datasets query
//!
//! Lists the datasets visible to the caller: their own uploads plus public
//! ones (staff see everything). Results are newest-first and paginated.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;
use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::features::shared::validation::access_level_label;

/// Deserialized query-string parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListDatasetsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    /// Optional filter on the declared data type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl ListDatasetsParams {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct ListDatasetsQuery {
    pub params: ListDatasetsParams,
    pub requested_by: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: Uuid,
    pub lineage_id: Uuid,
    pub version: i32,
    pub file_name: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    pub access_level: String,
    pub downloads_count: i64,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListDatasetsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<DatasetSummary>, ListDatasetsError>> for ListDatasetsQuery {}

impl crate::cqrs::middleware::Query for ListDatasetsQuery {}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    lineage_id: Uuid,
    version: i32,
    file_name: String,
    file_size: i64,
    description: Option<String>,
    data_type: Option<String>,
    is_public: bool,
    downloads_count: i64,
    uploaded_by: Uuid,
    uploaded_at: DateTime<Utc>,
}

#[tracing::instrument(skip(pool, query), fields(page = ?query.params.page))]
pub async fn handle(
    pool: PgPool,
    query: ListDatasetsQuery,
) -> Result<Paginated<DatasetSummary>, ListDatasetsError> {
    let pagination = query.params.pagination();
    pagination
        .validate()
        .map_err(ListDatasetsError::InvalidPagination)?;

    let is_staff = query.requested_by.is_staff();
    let user_id = query.requested_by.user_id();

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM datasets
        WHERE ($1 OR is_public OR uploaded_by = $2)
          AND ($3::text IS NULL OR data_type = $3)
        "#,
    )
    .bind(is_staff)
    .bind(user_id)
    .bind(&query.params.data_type)
    .fetch_one(&pool)
    .await?;

    let rows = sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT id, lineage_id, version, file_name, OCTET_LENGTH(content)::bigint AS file_size,
               description, data_type, is_public, downloads_count, uploaded_by, uploaded_at
        FROM datasets
        WHERE ($1 OR is_public OR uploaded_by = $2)
          AND ($3::text IS NULL OR data_type = $3)
        ORDER BY uploaded_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(is_staff)
    .bind(user_id)
    .bind(&query.params.data_type)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| DatasetSummary {
            id: row.id,
            lineage_id: row.lineage_id,
            version: row.version,
            file_name: row.file_name,
            file_size: row.file_size,
            description: row.description,
            data_type: row.data_type,
            access_level: access_level_label(row.is_public).to_string(),
            downloads_count: row.downloads_count,
            uploaded_by: row.uploaded_by,
            uploaded_at: row.uploaded_at,
        })
        .collect();

    Ok(Paginated::from_items(items, &pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::datasets::commands::upload::{self, UploadDatasetCommand};

    async fn seed(pool: &PgPool, owner: Uuid, is_public: bool, name: &str) {
        let command = UploadDatasetCommand {
            uploaded_by: owner,
            file_name: name.to_string(),
            content: b"a,b\n1,2\n".to_vec(),
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
        upload::handle(pool.clone(), command).await.unwrap();
    }

    fn list_query(principal: Principal) -> ListDatasetsQuery {
        ListDatasetsQuery {
            params: ListDatasetsParams::default(),
            requested_by: principal,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_anonymous_sees_only_public(pool: PgPool) -> sqlx::Result<()> {
        let owner = Uuid::new_v4();
        seed(&pool, owner, true, "public.csv").await;
        seed(&pool, owner, false, "private.csv").await;

        let result = handle(pool.clone(), list_query(Principal::Anonymous))
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].file_name, "public.csv");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_owner_sees_own_private(pool: PgPool) -> sqlx::Result<()> {
        let owner = Uuid::new_v4();
        seed(&pool, owner, false, "mine.csv").await;
        seed(&pool, Uuid::new_v4(), false, "theirs.csv").await;

        let result = handle(pool.clone(), list_query(Principal::user(owner)))
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.items[0].file_name, "mine.csv");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_staff_sees_everything(pool: PgPool) -> sqlx::Result<()> {
        seed(&pool, Uuid::new_v4(), false, "one.csv").await;
        seed(&pool, Uuid::new_v4(), false, "two.csv").await;

        let result = handle(pool.clone(), list_query(Principal::staff(Uuid::new_v4())))
            .await
            .unwrap();
        assert_eq!(result.pagination.total, 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_invalid_pagination_rejected(pool: PgPool) -> sqlx::Result<()> {
        let mut query = list_query(Principal::Anonymous);
        query.params.page = Some(0);
        let result = handle(pool.clone(), query).await;
        assert!(matches!(result, Err(ListDatasetsError::InvalidPagination(_))));
        Ok(())
    }
}
