//! Add project collaborator command

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;
use crate::features::shared::validation::validate_collaborator_role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCollaboratorCommand {
    pub project_id: Uuid,
    pub requested_by: Principal,
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCollaboratorResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AddCollaboratorError {
    #[error("{0}")]
    RoleValidation(String),
    #[error("Research project '{0}' not found")]
    ProjectNotFound(Uuid),
    #[error("You don't have permission to add collaborators")]
    NotPermitted,
    #[error("User is already the head researcher")]
    AlreadyHead,
    #[error("User is already a collaborator")]
    AlreadyCollaborator,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<AddCollaboratorResponse, AddCollaboratorError>> for AddCollaboratorCommand {}

impl crate::cqrs::middleware::Command for AddCollaboratorCommand {}

impl AddCollaboratorCommand {
    pub fn validate(&self) -> Result<(), AddCollaboratorError> {
        validate_collaborator_role(&self.role).map_err(AddCollaboratorError::RoleValidation)
    }
}

/// Handles the add collaborator command
///
/// Only the head researcher, manager collaborators, or staff may add
/// members. The head researcher cannot also be a collaborator.
#[tracing::instrument(skip(pool, command), fields(project_id = %command.project_id, user_id = %command.user_id))]
pub async fn handle(
    pool: PgPool,
    command: AddCollaboratorCommand,
) -> Result<AddCollaboratorResponse, AddCollaboratorError> {
    command.validate()?;

    let project = super::super::fetch_project(&pool, command.project_id)
        .await?
        .ok_or(AddCollaboratorError::ProjectNotFound(command.project_id))?;

    if !super::super::can_manage(&pool, &project, &command.requested_by).await? {
        return Err(AddCollaboratorError::NotPermitted);
    }

    if command.user_id == project.head_researcher {
        return Err(AddCollaboratorError::AlreadyHead);
    }

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        r#"
        INSERT INTO project_collaborators (project_id, user_id, role, invited_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id, joined_at
        "#,
    )
    .bind(command.project_id)
    .bind(command.user_id)
    .bind(&command.role)
    .bind(command.requested_by.user_id())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return AddCollaboratorError::AlreadyCollaborator;
            }
        }
        AddCollaboratorError::Database(e)
    })?;

    tracing::info!(
        collaborator_id = %row.0,
        role = %command.role,
        "Collaborator added to project"
    );

    Ok(AddCollaboratorResponse {
        id: row.0,
        project_id: command.project_id,
        user_id: command.user_id,
        role: command.role,
        joined_at: row.1,
    })
}
