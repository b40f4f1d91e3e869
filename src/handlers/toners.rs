use crate::{
    calculations::TonerFigures,
    commands::toners::{
        create_toner_command::CreateTonerCommand, update_toner_command::UpdateTonerCommand,
        TonerInput,
    },
    entities::toner,
    errors::ServiceError,
    handlers::common::{csv_response, Deleted},
    services::{export, listing::ListFilter},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/toners",
    params(ListFilter),
    responses(
        (status = 200, description = "Toners listed, newest first", body = ApiResponse<Vec<toner::Model>>),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "toners"
)]
pub async fn list_toners(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<toner::Model>> {
    let toners = state.services.toners.list_toners(&filter).await?;
    Ok(Json(ApiResponse::success(toners)))
}

#[utoipa::path(
    get,
    path = "/api/v1/toners/:id",
    params(
        ("id" = Uuid, Path, description = "Toner ID")
    ),
    responses(
        (status = 200, description = "Toner fetched", body = ApiResponse<toner::Model>),
        (status = 404, description = "Toner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "toners"
)]
pub async fn get_toner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<toner::Model> {
    let toner = state.services.toners.get_toner(id).await?;
    Ok(Json(ApiResponse::success(toner)))
}

#[utoipa::path(
    post,
    path = "/api/v1/toners",
    request_body = TonerInput,
    responses(
        (status = 200, description = "Toner registered", body = ApiResponse<toner::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Missing menu permission", body = crate::errors::ErrorResponse)
    ),
    tag = "toners"
)]
pub async fn create_toner(
    State(state): State<AppState>,
    Json(input): Json<TonerInput>,
) -> ApiResult<toner::Model> {
    let created = state
        .services
        .toners
        .create_toner(CreateTonerCommand { input })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/toners/:id",
    request_body = TonerInput,
    params(
        ("id" = Uuid, Path, description = "Toner ID")
    ),
    responses(
        (status = 200, description = "Toner updated", body = ApiResponse<toner::Model>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Toner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "toners"
)]
pub async fn update_toner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TonerInput>,
) -> ApiResult<toner::Model> {
    let updated = state
        .services
        .toners
        .update_toner(UpdateTonerCommand { id, input })
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/toners/:id",
    params(
        ("id" = Uuid, Path, description = "Toner ID")
    ),
    responses(
        (status = 200, description = "Toner and its returned units deleted", body = ApiResponse<Deleted>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Toner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "toners"
)]
pub async fn delete_toner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    let cascaded = state.services.toners.delete_toner(id).await?;
    Ok(Json(ApiResponse::success(Deleted::with_cascade(id, cascaded))))
}

/// Price per page and net weight for a toner being edited.
#[utoipa::path(
    post,
    path = "/api/v1/toners/preview",
    request_body = TonerInput,
    responses(
        (status = 200, description = "Derived figures", body = ApiResponse<TonerFigures>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "toners"
)]
pub async fn preview_toner(
    State(state): State<AppState>,
    Json(input): Json<TonerInput>,
) -> ApiResult<TonerFigures> {
    let figures = state.services.toners.preview(&input)?;
    Ok(Json(ApiResponse::success(figures)))
}

#[utoipa::path(
    get,
    path = "/api/v1/toners/export",
    params(ListFilter),
    responses(
        (status = 200, description = "Filtered toners as CSV", content_type = "text/csv", body = String)
    ),
    tag = "toners"
)]
pub async fn export_toners(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Response, ServiceError> {
    let toners = state.services.toners.list_toners(&filter).await?;
    Ok(csv_response("toners.csv", export::toners_csv(&toners)?))
}
