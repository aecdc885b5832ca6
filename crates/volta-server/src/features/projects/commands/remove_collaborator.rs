//! Remove project collaborator command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::access::Principal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveCollaboratorCommand {
    pub project_id: Uuid,
    pub collaborator_id: Uuid,
    pub requested_by: Principal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveCollaboratorResponse {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveCollaboratorError {
    #[error("Research project '{0}' not found")]
    ProjectNotFound(Uuid),
    #[error("You don't have permission to manage collaborators")]
    NotPermitted,
    #[error("Collaborator '{0}' not found")]
    CollaboratorNotFound(Uuid),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<RemoveCollaboratorResponse, RemoveCollaboratorError>>
    for RemoveCollaboratorCommand
{
}

impl crate::cqrs::middleware::Command for RemoveCollaboratorCommand {}

#[tracing::instrument(skip(pool, command), fields(project_id = %command.project_id, collaborator_id = %command.collaborator_id))]
pub async fn handle(
    pool: PgPool,
    command: RemoveCollaboratorCommand,
) -> Result<RemoveCollaboratorResponse, RemoveCollaboratorError> {
    let project = super::super::fetch_project(&pool, command.project_id)
        .await?
        .ok_or(RemoveCollaboratorError::ProjectNotFound(command.project_id))?;

    if !super::super::can_manage(&pool, &project, &command.requested_by).await? {
        return Err(RemoveCollaboratorError::NotPermitted);
    }

    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        DELETE FROM project_collaborators
        WHERE id = $1 AND project_id = $2
        RETURNING user_id
        "#,
    )
    .bind(command.collaborator_id)
    .bind(command.project_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(RemoveCollaboratorError::CollaboratorNotFound(command.collaborator_id))?;

    tracing::info!(user_id = %user_id, "Collaborator removed from project");

    Ok(RemoveCollaboratorResponse {
        id: command.collaborator_id,
        user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::projects::commands::add_collaborator::{self, AddCollaboratorCommand};
    use crate::features::projects::commands::create::{self, CreateProjectCommand};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_removes_collaborator(pool: PgPool) -> sqlx::Result<()> {
        let head = Uuid::new_v4();
        let user = Uuid::new_v4();

        let project_id = create::handle(
            pool.clone(),
            CreateProjectCommand {
                created_by: head,
                title: "Test project".to_string(),
                description: String::new(),
                is_public: false,
            },
        )
        .await
        .unwrap()
        .id;

        let collaborator = add_collaborator::handle(
            pool.clone(),
            AddCollaboratorCommand {
                project_id,
                requested_by: Principal::user(head),
                user_id: user,
                role: "viewer".to_string(),
            },
        )
        .await
        .unwrap();

        let response = handle(
            pool.clone(),
            RemoveCollaboratorCommand {
                project_id,
                collaborator_id: collaborator.id,
                requested_by: Principal::user(head),
            },
        )
        .await
        .unwrap();
        assert_eq!(response.user_id, user);

        let remaining: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM project_collaborators WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(remaining, 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_unknown_collaborator(pool: PgPool) -> sqlx::Result<()> {
        let head = Uuid::new_v4();
        let project_id = create::handle(
            pool.clone(),
            CreateProjectCommand {
                created_by: head,
                title: "Test project".to_string(),
                description: String::new(),
                is_public: false,
            },
        )
        .await
        .unwrap()
        .id;

        let result = handle(
            pool.clone(),
            RemoveCollaboratorCommand {
                project_id,
                collaborator_id: Uuid::new_v4(),
                requested_by: Principal::user(head),
            },
        )
        .await;
        assert!(matches!(result, Err(RemoveCollaboratorError::CollaboratorNotFound(_))));
        Ok(())
    }
}
