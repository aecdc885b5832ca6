//! List data categories query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListCategoriesQuery {}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryInfo {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListCategoriesError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<CategoryInfo>, ListCategoriesError>> for ListCategoriesQuery {}

impl crate::cqrs::middleware::Query for ListCategoriesQuery {}

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    _query: ListCategoriesQuery,
) -> Result<Vec<CategoryInfo>, ListCategoriesError> {
    let categories = sqlx::query_as::<_, CategoryInfo>(
        "SELECT id, name, description FROM data_categories ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_lists_seeded_categories(pool: PgPool) -> sqlx::Result<()> {
        let categories = handle(pool.clone(), ListCategoriesQuery::default())
            .await
            .unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"published"));
        assert!(names.contains(&"peer_review"));
        assert!(names.contains(&"research"));
        assert!(names.contains(&"other"));
        Ok(())
    }
}
