//! Create research project command

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_name, NameValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectCommand {
    pub created_by: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub is_public: bool,
    pub head_researcher: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateProjectError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Title must not exceed 255 characters")]
    TitleLength,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<CreateProjectResponse, CreateProjectError>> for CreateProjectCommand {}

impl crate::cqrs::middleware::Command for CreateProjectCommand {}

impl CreateProjectCommand {
    pub fn validate(&self) -> Result<(), CreateProjectError> {
        validate_name(&self.title, "Title", 255).map_err(|e| match e {
            NameValidationError::Required { .. } => CreateProjectError::TitleRequired,
            NameValidationError::TooLong { .. } => CreateProjectError::TitleLength,
        })
    }
}

/// Handles the create project command
///
/// The caller becomes the project's head researcher; new projects start in
/// the `active` state.
#[tracing::instrument(skip(pool, command), fields(title = %command.title))]
pub async fn handle(
    pool: PgPool,
    command: CreateProjectCommand,
) -> Result<CreateProjectResponse, CreateProjectError> {
    command.validate()?;

    let row = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
        r#"
        INSERT INTO research_projects (title, description, head_researcher, is_public)
        VALUES ($1, $2, $3, $4)
        RETURNING id, status, created_at
        "#,
    )
    .bind(&command.title)
    .bind(&command.description)
    .bind(command.created_by)
    .bind(command.is_public)
    .fetch_one(&pool)
    .await?;

    tracing::info!(project_id = %row.0, "Research project created");

    Ok(CreateProjectResponse {
        id: row.0,
        title: command.title,
        description: command.description,
        status: row.1,
        is_public: command.is_public,
        head_researcher: command.created_by,
        created_at: row.2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_success() {
        let cmd = CreateProjectCommand {
            created_by: Uuid::new_v4(),
            title: "Sensor surface degradation study".to_string(),
            description: String::new(),
            is_public: false,
        };
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_title() {
        let cmd = CreateProjectCommand {
            created_by: Uuid::new_v4(),
            title: "  ".to_string(),
            description: String::new(),
            is_public: false,
        };
        assert!(matches!(cmd.validate(), Err(CreateProjectError::TitleRequired)));
    }

    #[test]
    fn test_validation_title_too_long() {
        let cmd = CreateProjectCommand {
            created_by: Uuid::new_v4(),
            title: "a".repeat(256),
            description: String::new(),
            is_public: false,
        };
        assert!(matches!(cmd.validate(), Err(CreateProjectError::TitleLength)));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_creates_active_project(pool: PgPool) -> sqlx::Result<()> {
        let head = Uuid::new_v4();
        let cmd = CreateProjectCommand {
            created_by: head,
            title: "Electrode fouling".to_string(),
            description: "Fouling rates across electrode materials".to_string(),
            is_public: true,
        };

        let response = handle(pool.clone(), cmd).await.unwrap();
        assert_eq!(response.status, "active");
        assert_eq!(response.head_researcher, head);
        assert!(response.is_public);
        Ok(())
    }
}
