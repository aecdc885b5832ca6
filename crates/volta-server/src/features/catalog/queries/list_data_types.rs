//! List data types query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListDataTypesQuery {}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DataTypeInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ListDataTypesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<DataTypeInfo>, ListDataTypesError>> for ListDataTypesQuery {}

impl crate::cqrs::middleware::Query for ListDataTypesQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    _query: ListDataTypesQuery,
) -> Result<Vec<DataTypeInfo>, ListDataTypesError> {
    let data_types = sqlx::query_as::<_, DataTypeInfo>(
        "SELECT id, name FROM data_types ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(data_types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_lists_seeded_types(pool: PgPool) -> sqlx::Result<()> {
        let data_types = handle(pool.clone(), ListDataTypesQuery::default())
            .await
            .unwrap();
        assert!(data_types.iter().any(|t| t.id == "cyclic_voltammetry"));
        assert!(data_types.iter().any(|t| t.id == "chronoamperometry"));
        Ok(())
    }
}
