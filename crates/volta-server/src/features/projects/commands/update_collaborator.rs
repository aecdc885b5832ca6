//! Update collaborator role command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;
use crate::features::shared::validation::validate_collaborator_role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCollaboratorCommand {
    pub project_id: Uuid,
    pub collaborator_id: Uuid,
    pub requested_by: Principal,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCollaboratorResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateCollaboratorError {
    #[error("{0}")]
    RoleValidation(String),
    #[error("Research project '{0}' not found")]
    ProjectNotFound(Uuid),
    #[error("You don't have permission to manage collaborators")]
    NotPermitted,
    #[error("Collaborator '{0}' not found")]
    CollaboratorNotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<UpdateCollaboratorResponse, UpdateCollaboratorError>>
    for UpdateCollaboratorCommand
{
}

impl crate::cqrs::middleware::Command for UpdateCollaboratorCommand {}

impl UpdateCollaboratorCommand {
    pub fn validate(&self) -> Result<(), UpdateCollaboratorError> {
        validate_collaborator_role(&self.role).map_err(UpdateCollaboratorError::RoleValidation)
    }
}

#[tracing::instrument(skip(pool, command), fields(project_id = %command.project_id, collaborator_id = %command.collaborator_id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateCollaboratorCommand,
) -> Result<UpdateCollaboratorResponse, UpdateCollaboratorError> {
    command.validate()?;

    let project = super::super::fetch_project(&pool, command.project_id)
        .await?
        .ok_or(UpdateCollaboratorError::ProjectNotFound(command.project_id))?;

    if !super::super::can_manage(&pool, &project, &command.requested_by).await? {
        return Err(UpdateCollaboratorError::NotPermitted);
    }

    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE project_collaborators
        SET role = $1
        WHERE id = $2 AND project_id = $3
        RETURNING user_id
        "#,
    )
    .bind(&command.role)
    .bind(command.collaborator_id)
    .bind(command.project_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(UpdateCollaboratorError::CollaboratorNotFound(command.collaborator_id))?;

    tracing::info!(role = %command.role, "Collaborator role updated");

    Ok(UpdateCollaboratorResponse {
        id: command.collaborator_id,
        user_id,
        role: command.role,
    })
}
