//! Dataset feature slice
//!
//! Uploaded datasets are stored inline as UTF-8 text with an append-only
//! version chain: creating a new version inserts a new row sharing the
//! original's `lineage_id` and never touches existing rows.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::datasets_routes;

use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::{CollaboratorRole, ProjectContext};
use types::DatasetRow;

/// Fetch one dataset row by id.
pub(crate) async fn fetch_dataset(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<DatasetRow>, sqlx::Error> {
    sqlx::query_as::<_, DatasetRow>(
        r#"
        SELECT id, lineage_id, version, file_name, content, checksum, description,
               changes, uploaded_by, uploaded_at, data_type, category_id, project_id,
               method, electrode_type, instrument, is_public, delimiter, downloads_count
        FROM datasets
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Load the owning project's state for the access gate.
///
/// Returns `None` when the dataset has no project or the referenced project
/// no longer exists.
pub(crate) async fn fetch_project_context(
    pool: &PgPool,
    project_id: Option<Uuid>,
) -> Result<Option<ProjectContext>, sqlx::Error> {
    let Some(project_id) = project_id else {
        return Ok(None);
    };

    let Some((head_researcher, is_public)) = sqlx::query_as::<_, (Uuid, bool)>(
        "SELECT head_researcher, is_public FROM research_projects WHERE id = $1",
    )
    .bind(project_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let collaborators = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT user_id, role FROM project_collaborators WHERE project_id = $1",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .filter_map(|(user_id, role)| CollaboratorRole::parse(&role).map(|role| (user_id, role)))
    .collect();

    Ok(Some(ProjectContext {
        head_researcher,
        is_public,
        collaborators,
    }))
}
