use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::commands::{
    add_collaborator, create, remove_collaborator, update_collaborator, AddCollaboratorCommand,
    AddCollaboratorError, CreateProjectCommand, CreateProjectError, RemoveCollaboratorCommand,
    RemoveCollaboratorError, UpdateCollaboratorCommand, UpdateCollaboratorError,
};
use super::queries::{
    get as get_query, list, GetProjectError, GetProjectQuery, ListProjectsError,
    ListProjectsParams, ListProjectsQuery,
};
use crate::features::shared::principal::Principal;

pub fn projects_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route("/:id", get(get_project))
        .route("/:id/collaborators", post(add_project_collaborator))
        .route(
            "/:id/collaborators/:collab_id",
            put(update_project_collaborator).delete(remove_project_collaborator),
        )
}

#[derive(Debug, Deserialize)]
struct CreateProjectBody {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_public: bool,
}

#[tracing::instrument(skip(pool, principal, body))]
async fn create_project(
    State(pool): State<PgPool>,
    principal: Principal,
    Json(body): Json<CreateProjectBody>,
) -> Result<Response, ProjectApiError> {
    let Some(created_by) = principal.user_id() else {
        return Err(ProjectApiError::AuthRequired);
    };

    let command = CreateProjectCommand {
        created_by,
        title: body.title,
        description: body.description,
        is_public: body.is_public,
    };

    let response = create::handle(pool, command).await?;

    tracing::info!(project_id = %response.id, "Research project created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, principal, params))]
async fn list_projects(
    State(pool): State<PgPool>,
    principal: Principal,
    Query(params): Query<ListProjectsParams>,
) -> Result<Response, ProjectApiError> {
    let query = ListProjectsQuery {
        params,
        requested_by: principal,
    };

    let response = list::handle(pool, query).await?;

    let meta = json!({
        "pagination": response.pagination
    });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
        .into_response())
}

#[tracing::instrument(skip(pool, principal), fields(project_id = %id))]
async fn get_project(
    State(pool): State<PgPool>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Response, ProjectApiError> {
    let query = GetProjectQuery {
        project_id: id,
        requested_by: principal,
    };

    let response = get_query::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug, Deserialize)]
struct AddCollaboratorBody {
    user_id: Uuid,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String {
    "viewer".to_string()
}

#[tracing::instrument(skip(pool, principal, body), fields(project_id = %id))]
async fn add_project_collaborator(
    State(pool): State<PgPool>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<AddCollaboratorBody>,
) -> Result<Response, ProjectApiError> {
    let command = AddCollaboratorCommand {
        project_id: id,
        requested_by: principal,
        user_id: body.user_id,
        role: body.role,
    };

    let response = add_collaborator::handle(pool, command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug, Deserialize)]
struct UpdateCollaboratorBody {
    role: String,
}

#[tracing::instrument(skip(pool, principal, body), fields(project_id = %id, collaborator_id = %collab_id))]
async fn update_project_collaborator(
    State(pool): State<PgPool>,
    principal: Principal,
    Path((id, collab_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateCollaboratorBody>,
) -> Result<Response, ProjectApiError> {
    let command = UpdateCollaboratorCommand {
        project_id: id,
        collaborator_id: collab_id,
        requested_by: principal,
        role: body.role,
    };

    let response = update_collaborator::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, principal), fields(project_id = %id, collaborator_id = %collab_id))]
async fn remove_project_collaborator(
    State(pool): State<PgPool>,
    principal: Principal,
    Path((id, collab_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ProjectApiError> {
    let command = RemoveCollaboratorCommand {
        project_id: id,
        collaborator_id: collab_id,
        requested_by: principal,
    };

    let response = remove_collaborator::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
enum ProjectApiError {
    AuthRequired,
    CreateError(CreateProjectError),
    AddError(AddCollaboratorError),
    UpdateError(UpdateCollaboratorError),
    RemoveError(RemoveCollaboratorError),
    GetError(GetProjectError),
    ListError(ListProjectsError),
}

impl From<CreateProjectError> for ProjectApiError {
    fn from(err: CreateProjectError) -> Self {
        Self::CreateError(err)
    }
}

impl From<AddCollaboratorError> for ProjectApiError {
    fn from(err: AddCollaboratorError) -> Self {
        Self::AddError(err)
    }
}

impl From<UpdateCollaboratorError> for ProjectApiError {
    fn from(err: UpdateCollaboratorError) -> Self {
        Self::UpdateError(err)
    }
}

impl From<RemoveCollaboratorError> for ProjectApiError {
    fn from(err: RemoveCollaboratorError) -> Self {
        Self::RemoveError(err)
    }
}

impl From<GetProjectError> for ProjectApiError {
    fn from(err: GetProjectError) -> Self {
        Self::GetError(err)
    }
}

impl From<ListProjectsError> for ProjectApiError {
    fn from(err: ListProjectsError) -> Self {
        Self::ListError(err)
    }
}

impl IntoResponse for ProjectApiError {
    fn into_response(self) -> Response {
        match self {
            ProjectApiError::AuthRequired => {
                let error = ErrorResponse::new("UNAUTHORIZED", "Authentication required");
                (StatusCode::UNAUTHORIZED, Json(error)).into_response()
            },

            ProjectApiError::CreateError(CreateProjectError::TitleRequired)
            | ProjectApiError::CreateError(CreateProjectError::TitleLength) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ProjectApiError::CreateError(CreateProjectError::Database(_)) => {
                tracing::error!("Database error during project creation: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            ProjectApiError::AddError(AddCollaboratorError::RoleValidation(_))
            | ProjectApiError::AddError(AddCollaboratorError::AlreadyHead)
            | ProjectApiError::AddError(AddCollaboratorError::AlreadyCollaborator) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ProjectApiError::AddError(AddCollaboratorError::ProjectNotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ProjectApiError::AddError(AddCollaboratorError::NotPermitted) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            ProjectApiError::AddError(AddCollaboratorError::Database(_)) => {
                tracing::error!("Database error while adding collaborator: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            ProjectApiError::UpdateError(UpdateCollaboratorError::RoleValidation(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ProjectApiError::UpdateError(UpdateCollaboratorError::ProjectNotFound(_))
            | ProjectApiError::UpdateError(UpdateCollaboratorError::CollaboratorNotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ProjectApiError::UpdateError(UpdateCollaboratorError::NotPermitted) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            ProjectApiError::UpdateError(UpdateCollaboratorError::Database(_)) => {
                tracing::error!("Database error while updating collaborator: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            ProjectApiError::RemoveError(RemoveCollaboratorError::ProjectNotFound(_))
            | ProjectApiError::RemoveError(RemoveCollaboratorError::CollaboratorNotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ProjectApiError::RemoveError(RemoveCollaboratorError::NotPermitted) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            ProjectApiError::RemoveError(RemoveCollaboratorError::Database(_)) => {
                tracing::error!("Database error while removing collaborator: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            ProjectApiError::GetError(GetProjectError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ProjectApiError::GetError(GetProjectError::AccessDenied) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            ProjectApiError::GetError(GetProjectError::Database(_)) => {
                tracing::error!("Database error during project retrieval: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            ProjectApiError::ListError(ListProjectsError::InvalidPagination(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ProjectApiError::ListError(ListProjectsError::Database(_)) => {
                tracing::error!("Database error during project listing: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for ProjectApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "Authentication required"),
            Self::CreateError(e) => write!(f, "{}", e),
            Self::AddError(e) => write!(f, "{}", e),
            Self::UpdateError(e) => write!(f, "{}", e),
            Self::RemoveError(e) => write!(f, "{}", e),
            Self::GetError(e) => write!(f, "{}", e),
            Self::ListError(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProjectApiError::CreateError(CreateProjectError::TitleRequired);
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_routes_structure() {
        let router = projects_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}
