//! Get project details query
//!
//! Returns the project with its collaborator list and the caller's own role
//! in it. Private projects are visible only to members and staff.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::super::types::CollaboratorInfo;
use crate::features::shared::access::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProjectQuery {
    pub project_id: Uuid,
    pub requested_by: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProjectResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub is_public: bool,
    pub head_researcher: Uuid,
    pub collaborators: Vec<CollaboratorInfo>,
    pub datasets_count: i64,
    pub is_head: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum GetProjectError {
    #[error("Research project '{0}' not found")]
    NotFound(Uuid),
    #[error("You don't have access to this project")]
    AccessDenied,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<GetProjectResponse, GetProjectError>> for GetProjectQuery {}

impl crate::cqrs::middleware::Query for GetProjectQuery {}

#[tracing::instrument(skip(pool, query), fields(project_id = %query.project_id))]
pub async fn handle(
    pool: PgPool,
    query: GetProjectQuery,
) -> Result<GetProjectResponse, GetProjectError> {
    let project = super::super::fetch_project(&pool, query.project_id)
        .await?
        .ok_or(GetProjectError::NotFound(query.project_id))?;

    let collaborators = sqlx::query_as::<_, (Uuid, Uuid, String, DateTime<Utc>)>(
        r#"
        SELECT id, user_id, role, joined_at
        FROM project_collaborators
        WHERE project_id = $1
        ORDER BY joined_at
        "#,
    )
    .bind(project.id)
    .fetch_all(&pool)
    .await?;

    let user_id = query.requested_by.user_id();
    let is_head = user_id == Some(project.head_researcher);
    let collaborator_role = user_id.and_then(|user| {
        collaborators
            .iter()
            .find(|(_, collab_user, _, _)| *collab_user == user)
            .map(|(_, _, role, _)| role.clone())
    });

    let has_access = query.requested_by.is_staff()
        || is_head
        || project.is_public
        || collaborator_role.is_some();
    if !has_access {
        return Err(GetProjectError::AccessDenied);
    }

    let datasets_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM datasets WHERE project_id = $1")
            .bind(project.id)
            .fetch_one(&pool)
            .await?;

    let user_role = if is_head {
        Some("head".to_string())
    } else {
        collaborator_role
    };

    Ok(GetProjectResponse {
        id: project.id,
        title: project.title,
        description: project.description,
        status: project.status,
        is_public: project.is_public,
        head_researcher: project.head_researcher,
        collaborators: collaborators
            .into_iter()
            .map(|(id, user_id, role, joined_at)| CollaboratorInfo {
                id,
                user_id,
                role,
                joined_at,
            })
            .collect(),
        datasets_count,
        is_head,
        user_role,
        created_at: project.created_at,
        updated_at: project.updated_at,
    })
}
