use crate::{
    entities::work_instruction_version,
    errors::ServiceError,
    handlers::common::Deleted,
    services::{
        listing::ListFilter,
        work_instructions::{Upload, ViewRequest, WorkInstructionRow},
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    response::Json,
};
use utoipa::ToSchema;
use uuid::Uuid;

/// Multipart body accepted by the upload endpoints.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// Instruction name; ignored when adding a version
    name: Option<String>,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

struct UploadParts {
    name: Option<String>,
    upload: Upload,
}

fn multipart_error(err: MultipartError) -> ServiceError {
    ServiceError::InvalidInput(format!("Malformed upload: {}", err))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadParts, ServiceError> {
    let mut name = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(Upload { file_name, bytes });
            }
            _ => {}
        }
    }

    let upload = upload
        .filter(|u| !u.bytes.is_empty())
        .ok_or_else(|| ServiceError::ValidationError("A non-empty file is required".to_string()))?;
    Ok(UploadParts { name, upload })
}

#[utoipa::path(
    get,
    path = "/api/v1/work-instructions",
    params(ListFilter),
    responses(
        (status = 200, description = "Instructions with their versions, newest first", body = ApiResponse<Vec<WorkInstructionRow>>)
    ),
    tag = "work-instructions"
)]
pub async fn list_instructions(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<WorkInstructionRow>> {
    let rows = state.services.work_instructions.list(&filter).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    post,
    path = "/api/v1/work-instructions",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Instruction created as version 1.0", body = ApiResponse<WorkInstructionRow>),
        (status = 400, description = "Missing name or file", body = crate::errors::ErrorResponse)
    ),
    tag = "work-instructions"
)]
pub async fn create_instruction(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<WorkInstructionRow> {
    let parts = read_upload(multipart).await?;
    let name = parts.name.unwrap_or_default();
    let created = state
        .services
        .work_instructions
        .create(&name, parts.upload)
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/work-instructions/:id/versions",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    params(
        ("id" = Uuid, Path, description = "Work instruction ID")
    ),
    responses(
        (status = 200, description = "New version stored", body = ApiResponse<work_instruction_version::Model>),
        (status = 404, description = "Work instruction not found", body = crate::errors::ErrorResponse)
    ),
    tag = "work-instructions"
)]
pub async fn add_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<work_instruction_version::Model> {
    let parts = read_upload(multipart).await?;
    let version = state
        .services
        .work_instructions
        .add_version(id, parts.upload)
        .await?;
    Ok(Json(ApiResponse::success(version)))
}

#[utoipa::path(
    post,
    path = "/api/v1/work-instructions/versions/:id/views",
    request_body = ViewRequest,
    params(
        ("id" = Uuid, Path, description = "Work instruction version ID")
    ),
    responses(
        (status = 200, description = "View appended to the version's log", body = ApiResponse<work_instruction_version::Model>),
        (status = 404, description = "Version not found", body = crate::errors::ErrorResponse)
    ),
    tag = "work-instructions"
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ViewRequest>,
) -> ApiResult<work_instruction_version::Model> {
    let version = state
        .services
        .work_instructions
        .record_view(id, request)
        .await?;
    Ok(Json(ApiResponse::success(version)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/work-instructions/:id",
    params(
        ("id" = Uuid, Path, description = "Work instruction ID")
    ),
    responses(
        (status = 200, description = "Instruction and version rows deleted", body = ApiResponse<Deleted>),
        (status = 403, description = "Administrators only", body = crate::errors::ErrorResponse),
        (status = 404, description = "Work instruction not found", body = crate::errors::ErrorResponse)
    ),
    tag = "work-instructions"
)]
pub async fn delete_instruction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    state.services.work_instructions.delete(id).await?;
    Ok(Json(ApiResponse::success(Deleted::new(id))))
}
