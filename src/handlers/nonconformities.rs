use crate::{
    commands::nonconformities::{
        change_nc_status_command::ChangeNcStatusCommand,
        open_non_conformity_command::OpenNonConformityCommand,
        update_non_conformity_command::UpdateNonConformityCommand, NonConformityInput,
    },
    entities::non_conformity,
    errors::ServiceError,
    handlers::common::{csv_response, Deleted},
    services::{export, listing::ListFilter, nonconformities::NcFilter},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct NextNumber {
    /// Number the next opened NC will most likely receive
    #[schema(example = "NC-2024-0008")]
    pub number: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/non-conformities/next-number",
    responses(
        (status = 200, description = "Upcoming NC number; nothing is reserved", body = ApiResponse<NextNumber>)
    ),
    tag = "non-conformities"
)]
pub async fn next_number(State(state): State<AppState>) -> ApiResult<NextNumber> {
    let number = state.services.nonconformities.next_number().await?;
    Ok(Json(ApiResponse::success(NextNumber { number })))
}

#[utoipa::path(
    get,
    path = "/api/v1/non-conformities",
    params(ListFilter, NcFilter),
    responses(
        (status = 200, description = "Non-conformities listed, newest first", body = ApiResponse<Vec<non_conformity::Model>>),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse)
    ),
    tag = "non-conformities"
)]
pub async fn list_non_conformities(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
    Query(nc_filter): Query<NcFilter>,
) -> ApiResult<Vec<non_conformity::Model>> {
    let rows = state
        .services
        .nonconformities
        .list(&filter, &nc_filter)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/non-conformities/export",
    params(ListFilter, NcFilter),
    responses(
        (status = 200, description = "Filtered non-conformities as CSV", content_type = "text/csv", body = String)
    ),
    tag = "non-conformities"
)]
pub async fn export_non_conformities(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
    Query(nc_filter): Query<NcFilter>,
) -> Result<Response, ServiceError> {
    let rows = state
        .services
        .nonconformities
        .list(&filter, &nc_filter)
        .await?;
    Ok(csv_response(
        "non-conformities.csv",
        export::non_conformities_csv(&rows)?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/non-conformities/:id",
    params(
        ("id" = Uuid, Path, description = "Non-conformity ID")
    ),
    responses(
        (status = 200, description = "Non-conformity fetched", body = ApiResponse<non_conformity::Model>),
        (status = 404, description = "Non-conformity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "non-conformities"
)]
pub async fn get_non_conformity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<non_conformity::Model> {
    let nc = state.services.nonconformities.get(id).await?;
    Ok(Json(ApiResponse::success(nc)))
}

#[utoipa::path(
    post,
    path = "/api/v1/non-conformities",
    request_body = NonConformityInput,
    responses(
        (status = 200, description = "Non-conformity opened with its allocated number", body = ApiResponse<non_conformity::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "non-conformities"
)]
pub async fn open_non_conformity(
    State(state): State<AppState>,
    Json(input): Json<NonConformityInput>,
) -> ApiResult<non_conformity::Model> {
    let opened = state
        .services
        .nonconformities
        .open(OpenNonConformityCommand { input })
        .await?;
    Ok(Json(ApiResponse::success(opened)))
}

#[utoipa::path(
    put,
    path = "/api/v1/non-conformities/:id",
    request_body = NonConformityInput,
    params(
        ("id" = Uuid, Path, description = "Non-conformity ID")
    ),
    responses(
        (status = 200, description = "Non-conformity updated", body = ApiResponse<non_conformity::Model>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Non-conformity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "non-conformities"
)]
pub async fn update_non_conformity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NonConformityInput>,
) -> ApiResult<non_conformity::Model> {
    let updated = state
        .services
        .nonconformities
        .update(UpdateNonConformityCommand { id, input })
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/non-conformities/:id/status",
    request_body = ChangeNcStatusCommand,
    params(
        ("id" = Uuid, Path, description = "Non-conformity ID")
    ),
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<non_conformity::Model>),
        (status = 400, description = "Closing without solution evidence", body = crate::errors::ErrorResponse),
        (status = 404, description = "Non-conformity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "non-conformities"
)]
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut command): Json<ChangeNcStatusCommand>,
) -> ApiResult<non_conformity::Model> {
    command.id = id;
    let updated = state.services.nonconformities.change_status(command).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/non-conformities/:id",
    params(
        ("id" = Uuid, Path, description = "Non-conformity ID")
    ),
    responses(
        (status = 200, description = "Non-conformity deleted", body = ApiResponse<Deleted>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Non-conformity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "non-conformities"
)]
pub async fn delete_non_conformity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    state.services.nonconformities.delete(id).await?;
    Ok(Json(ApiResponse::success(Deleted::new(id))))
}
