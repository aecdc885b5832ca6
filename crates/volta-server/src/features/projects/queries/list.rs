//! List projects query
//!
//! Authenticated users see the projects they head or collaborate on; staff
//! see everything; anonymous callers see public projects only.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;
use crate::features::shared::pagination::{Paginated, PaginationParams};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListProjectsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl ListProjectsParams {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct ListProjectsQuery {
    pub params: ListProjectsParams,
    pub requested_by: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub is_public: bool,
    pub head_researcher: Uuid,
    pub is_head: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    pub datasets_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListProjectsError {
    #[error("{0}")]
    InvalidPagination(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<ProjectSummary>, ListProjectsError>> for ListProjectsQuery {}

impl crate::cqrs::middleware::Query for ListProjectsQuery {}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    is_public: bool,
    head_researcher: Uuid,
    user_role: Option<String>,
    datasets_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const VISIBILITY_CLAUSE: &str = r#"
    ($1 OR p.head_researcher = $2 OR c.id IS NOT NULL OR ($2::uuid IS NULL AND p.is_public))
"#;

#[tracing::instrument(skip(pool, query), fields(page = ?query.params.page))]
pub async fn handle(
    pool: PgPool,
    query: ListProjectsQuery,
) -> Result<Paginated<ProjectSummary>, ListProjectsError> {
    let pagination = query.params.pagination();
    pagination
        .validate()
        .map_err(ListProjectsError::InvalidPagination)?;

    let is_staff = query.requested_by.is_staff();
    let user_id = query.requested_by.user_id();

    let total = sqlx::query_scalar::<_, i64>(&format!(
        r#"
        SELECT COUNT(*)
        FROM research_projects p
        LEFT JOIN project_collaborators c ON c.project_id = p.id AND c.user_id = $2
        WHERE {}
        "#,
        VISIBILITY_CLAUSE
    ))
    .bind(is_staff)
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let rows = sqlx::query_as::<_, SummaryRow>(&format!(
        r#"
        SELECT p.id, p.title, p.description, p.status, p.is_public, p.head_researcher,
               c.role AS user_role,
               (SELECT COUNT(*) FROM datasets d WHERE d.project_id = p.id) AS datasets_count,
               p.created_at, p.updated_at
        FROM research_projects p
        LEFT JOIN project_collaborators c ON c.project_id = p.id AND c.user_id = $2
        WHERE {}
        ORDER BY p.created_at DESC
        LIMIT $3 OFFSET $4
        "#,
        VISIBILITY_CLAUSE
    ))
    .bind(is_staff)
    .bind(user_id)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| {
            let is_head = user_id == Some(row.head_researcher);
            let user_role = if is_head {
                Some("head".to_string())
            } else {
                row.user_role
            };
            ProjectSummary {
                id: row.id,
                title: row.title,
                description: row.description,
                status: row.status,
                is_public: row.is_public,
                head_researcher: row.head_researcher,
                is_head,
                user_role,
                datasets_count: row.datasets_count,
                created_at: row.created_at,
                updated_at: row.updated_at,
            }
        })
        .collect();

    Ok(Paginated::from_items(items, &pagination, total))
}
