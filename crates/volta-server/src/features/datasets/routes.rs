use crate::api::response::{ApiResponse, ErrorResponse};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::commands::{
    new_version, upload, CreateVersionCommand, CreateVersionError, UploadDatasetCommand,
    UploadDatasetError,
};
use super::queries::{
    download, get as get_query, list, list_versions, DownloadDatasetError, DownloadDatasetQuery,
    GetDatasetError, GetDatasetQuery, ListDatasetsError, ListDatasetsParams, ListDatasetsQuery,
    ListVersionsError, ListVersionsQuery,
};
use crate::features::shared::principal::Principal;

pub fn datasets_routes() -> Router<PgPool> {
    Router::new()
        .route("/", post(upload_dataset).get(list_datasets))
        .route("/download", get(download_dataset))
        .route("/:id", get(get_dataset))
        .route("/:id/versions", get(get_versions).post(create_version))
}

/// Default source delimiter when the upload form omits one
const DEFAULT_DELIMITER: &str = ",";

#[tracing::instrument(skip(pool, multipart, principal))]
async fn upload_dataset(
    State(pool): State<PgPool>,
    principal: Principal,
    mut multipart: Multipart,
) -> Result<Response, DatasetApiError> {
    let Some(uploaded_by) = principal.user_id() else {
        return Err(DatasetApiError::AuthRequired);
    };

    let mut content: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DatasetApiError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| DatasetApiError::Multipart(e.to_string()))?;
            content = Some(data.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| DatasetApiError::Multipart(e.to_string()))?;
            fields.set(&name, value)?;
        }
    }

    let content = content.ok_or(DatasetApiError::UploadError(UploadDatasetError::FileRequired))?;

    let command = UploadDatasetCommand {
        uploaded_by,
        file_name: file_name.unwrap_or_default(),
        content,
        data_type: fields.data_type,
        description: fields.description,
        access_level: fields.access_level.unwrap_or_else(|| "private".to_string()),
        category: fields.category,
        project: fields.project,
        method: fields.method,
        electrode_type: fields.electrode_type,
        instrument: fields.instrument,
        delimiter: fields.delimiter.unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
    };

    let response = upload::handle(pool, command).await?;

    tracing::info!(
        dataset_id = %response.id,
        file_name = %response.file_name,
        size = response.file_size,
        "Dataset uploaded via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

/// Text fields accepted by the upload form
#[derive(Default)]
struct UploadFields {
    data_type: Option<String>,
    description: Option<String>,
    access_level: Option<String>,
    category: Option<Uuid>,
    project: Option<Uuid>,
    method: Option<String>,
    electrode_type: Option<String>,
    instrument: Option<String>,
    delimiter: Option<String>,
}

impl UploadFields {
    fn set(&mut self, name: &str, value: String) -> Result<(), DatasetApiError> {
        match name {
            "dataType" => self.data_type = Some(value),
            "description" => self.description = Some(value),
            "accessLevel" => self.access_level = Some(value),
            "category" => {
                let id = Uuid::parse_str(&value).map_err(|_| {
                    DatasetApiError::UploadError(UploadDatasetError::InvalidCategory)
                })?;
                self.category = Some(id);
            },
            "project" => {
                let id = Uuid::parse_str(&value).map_err(|_| {
                    DatasetApiError::Multipart(format!("Invalid project id: {}", value))
                })?;
                self.project = Some(id);
            },
            "method" => self.method = Some(value),
            "electrodeType" => self.electrode_type = Some(value),
            "instrument" => self.instrument = Some(value),
            "delimiter" => self.delimiter = Some(value),
            // Unknown form fields are ignored
            _ => {},
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct DownloadParams {
    dataset: Option<String>,
    format: Option<String>,
    delimiter: Option<String>,
}

#[tracing::instrument(skip(pool, principal, params))]
async fn download_dataset(
    State(pool): State<PgPool>,
    principal: Principal,
    Query(params): Query<DownloadParams>,
) -> Result<Response, DatasetApiError> {
    let raw_id = params
        .dataset
        .ok_or(DatasetApiError::DownloadError(DownloadDatasetError::DatasetRequired))?;
    let dataset_id = Uuid::parse_str(&raw_id).map_err(|_| {
        DatasetApiError::DownloadError(DownloadDatasetError::InvalidDatasetId(raw_id))
    })?;

    let query = DownloadDatasetQuery {
        dataset_id,
        requested_by: principal,
        format: params.format.unwrap_or_else(|| "csv".to_string()),
        delimiter: params.delimiter.unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
    };

    let payload = download::handle(pool, query).await?;

    let headers = [
        (header::CONTENT_TYPE, payload.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", payload.file_name),
        ),
    ];

    Ok((StatusCode::OK, headers, payload.bytes).into_response())
}

#[tracing::instrument(skip(pool, principal), fields(dataset_id = %id))]
async fn get_dataset(
    State(pool): State<PgPool>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Response, DatasetApiError> {
    let query = GetDatasetQuery {
        dataset_id: id,
        requested_by: principal,
    };

    let response = get_query::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[tracing::instrument(skip(pool, principal, params))]
async fn list_datasets(
    State(pool): State<PgPool>,
    principal: Principal,
    Query(params): Query<ListDatasetsParams>,
) -> Result<Response, DatasetApiError> {
    let query = ListDatasetsQuery {
        params,
        requested_by: principal,
    };

    let response = list::handle(pool, query).await?;

    tracing::debug!(
        count = response.items.len(),
        total = response.pagination.total,
        "Datasets listed via API"
    );

    let meta = json!({
        "pagination": response.pagination
    });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
        .into_response())
}

#[tracing::instrument(skip(pool, principal), fields(dataset_id = %id))]
async fn get_versions(
    State(pool): State<PgPool>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Response, DatasetApiError> {
    let query = ListVersionsQuery {
        dataset_id: id,
        requested_by: principal,
    };

    let response = list_versions::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response.versions))).into_response())
}

#[derive(Debug, Deserialize)]
struct CreateVersionBody {
    file_content: String,
    changes: Option<String>,
}

#[tracing::instrument(skip(pool, principal, body), fields(dataset_id = %id))]
async fn create_version(
    State(pool): State<PgPool>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateVersionBody>,
) -> Result<Response, DatasetApiError> {
    let command = CreateVersionCommand {
        dataset_id: id,
        requested_by: principal,
        file_content: body.file_content,
        changes: body.changes,
    };

    let response = new_version::handle(pool, command).await?;

    tracing::info!(
        version_id = %response.id,
        version = response.version,
        "Dataset version created via API"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
enum DatasetApiError {
    AuthRequired,
    Multipart(String),
    UploadError(UploadDatasetError),
    VersionError(CreateVersionError),
    DownloadError(DownloadDatasetError),
    GetError(GetDatasetError),
    ListError(ListDatasetsError),
    ListVersionsError(ListVersionsError),
}

impl From<UploadDatasetError> for DatasetApiError {
    fn from(err: UploadDatasetError) -> Self {
        Self::UploadError(err)
    }
}

impl From<CreateVersionError> for DatasetApiError {
    fn from(err: CreateVersionError) -> Self {
        Self::VersionError(err)
    }
}

impl From<DownloadDatasetError> for DatasetApiError {
    fn from(err: DownloadDatasetError) -> Self {
        Self::DownloadError(err)
    }
}

impl From<GetDatasetError> for DatasetApiError {
    fn from(err: GetDatasetError) -> Self {
        Self::GetError(err)
    }
}

impl From<ListDatasetsError> for DatasetApiError {
    fn from(err: ListDatasetsError) -> Self {
        Self::ListError(err)
    }
}

impl From<ListVersionsError> for DatasetApiError {
    fn from(err: ListVersionsError) -> Self {
        Self::ListVersionsError(err)
    }
}

impl IntoResponse for DatasetApiError {
    fn into_response(self) -> Response {
        match self {
            DatasetApiError::AuthRequired => {
                let error = ErrorResponse::new("UNAUTHORIZED", "Authentication required");
                (StatusCode::UNAUTHORIZED, Json(error)).into_response()
            },
            DatasetApiError::Multipart(_) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },

            DatasetApiError::UploadError(UploadDatasetError::FileRequired)
            | DatasetApiError::UploadError(UploadDatasetError::FileNameRequired)
            | DatasetApiError::UploadError(UploadDatasetError::FileNameLength)
            | DatasetApiError::UploadError(UploadDatasetError::InvalidEncoding(_))
            | DatasetApiError::UploadError(UploadDatasetError::DataTypeRequired)
            | DatasetApiError::UploadError(UploadDatasetError::InvalidDataType)
            | DatasetApiError::UploadError(UploadDatasetError::InvalidCategory)
            | DatasetApiError::UploadError(UploadDatasetError::InvalidAccessLevel(_))
            | DatasetApiError::UploadError(UploadDatasetError::InvalidDelimiter(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            DatasetApiError::UploadError(UploadDatasetError::ProjectNotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            DatasetApiError::UploadError(UploadDatasetError::Database(_)) => {
                tracing::error!("Database error during dataset upload: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            DatasetApiError::VersionError(CreateVersionError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            DatasetApiError::VersionError(CreateVersionError::AccessDenied) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            DatasetApiError::VersionError(CreateVersionError::Database(_)) => {
                tracing::error!("Database error during version creation: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            DatasetApiError::DownloadError(DownloadDatasetError::DatasetRequired)
            | DatasetApiError::DownloadError(DownloadDatasetError::InvalidDatasetId(_))
            | DatasetApiError::DownloadError(DownloadDatasetError::InvalidFormat)
            | DatasetApiError::DownloadError(DownloadDatasetError::InvalidDelimiter(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            DatasetApiError::DownloadError(DownloadDatasetError::NotFound(_))
            | DatasetApiError::DownloadError(DownloadDatasetError::ContentNotFound) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            DatasetApiError::DownloadError(DownloadDatasetError::AccessDenied) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            DatasetApiError::DownloadError(DownloadDatasetError::Conversion(_)) => {
                tracing::error!("Conversion failed during dataset download: {}", self);
                let error = ErrorResponse::new("CONVERSION_ERROR", self.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            DatasetApiError::DownloadError(DownloadDatasetError::Database(_)) => {
                tracing::error!("Database error during dataset download: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            DatasetApiError::GetError(GetDatasetError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            DatasetApiError::GetError(GetDatasetError::AccessDenied) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            DatasetApiError::GetError(GetDatasetError::Database(_)) => {
                tracing::error!("Database error during dataset retrieval: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            DatasetApiError::ListError(ListDatasetsError::InvalidPagination(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            DatasetApiError::ListError(ListDatasetsError::Database(_)) => {
                tracing::error!("Database error during dataset listing: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            DatasetApiError::ListVersionsError(ListVersionsError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            DatasetApiError::ListVersionsError(ListVersionsError::AccessDenied) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            DatasetApiError::ListVersionsError(ListVersionsError::Database(_)) => {
                tracing::error!("Database error during version listing: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for DatasetApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "Authentication required"),
            Self::Multipart(msg) => write!(f, "Failed to read multipart data: {}", msg),
            Self::UploadError(e) => write!(f, "{}", e),
            Self::VersionError(e) => write!(f, "{}", e),
            Self::DownloadError(e) => write!(f, "{}", e),
            Self::GetError(e) => write!(f, "{}", e),
            Self::ListError(e) => write!(f, "{}", e),
            Self::ListVersionsError(e) => write!(f, "{}", e),
        }
    }
}
