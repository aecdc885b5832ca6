//! Research project feature slice
//!
//! Projects group datasets under one head researcher plus role-based
//! collaborators (viewer, contributor, manager). Heads and managers
//! administer membership; the dataset access gate consults the same
//! membership when deciding dataset visibility.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::projects_routes;

use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;
use types::ProjectRow;

/// Fetch one project row by id.
pub(crate) async fn fetch_project(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ProjectRow>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRow>(
        r#"
        SELECT id, title, description, status, head_researcher, is_public,
               created_at, updated_at
        FROM research_projects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Whether the principal may administer the project (membership, settings).
///
/// Staff, the head researcher, and manager collaborators qualify.
pub(crate) async fn can_manage(
    pool: &PgPool,
    project: &ProjectRow,
    principal: &Principal,
) -> Result<bool, sqlx::Error> {
    if principal.is_staff() {
        return Ok(true);
    }
    let Some(user_id) = principal.user_id() else {
        return Ok(false);
    };
    if user_id == project.head_researcher {
        return Ok(true);
    }

    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM project_collaborators
            WHERE project_id = $1 AND user_id = $2 AND role = 'manager'
        )
        "#,
    )
    .bind(project.id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}
