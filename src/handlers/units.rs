use crate::{
    entities::unit,
    handlers::common::Deleted,
    services::{listing::ListFilter, units::UnitInput},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/units",
    params(ListFilter),
    responses(
        (status = 200, description = "Units listed by name", body = ApiResponse<Vec<unit::Model>>)
    ),
    tag = "units"
)]
pub async fn list_units(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<unit::Model>> {
    let units = state.services.units.list_units(&filter).await?;
    Ok(Json(ApiResponse::success(units)))
}

#[utoipa::path(
    post,
    path = "/api/v1/units",
    request_body = UnitInput,
    responses(
        (status = 200, description = "Unit registered", body = ApiResponse<unit::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn create_unit(
    State(state): State<AppState>,
    Json(input): Json<UnitInput>,
) -> ApiResult<unit::Model> {
    let created = state.services.units.create_unit(input).await?;
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/units/:id",
    request_body = UnitInput,
    params(
        ("id" = Uuid, Path, description = "Unit ID")
    ),
    responses(
        (status = 200, description = "Unit renamed", body = ApiResponse<unit::Model>),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn rename_unit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UnitInput>,
) -> ApiResult<unit::Model> {
    let renamed = state.services.units.rename_unit(id, input).await?;
    Ok(Json(ApiResponse::success(renamed)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/units/:id",
    params(
        ("id" = Uuid, Path, description = "Unit ID")
    ),
    responses(
        (status = 200, description = "Unit and its returned units deleted", body = ApiResponse<Deleted>),
        (status = 404, description = "Unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "units"
)]
pub async fn delete_unit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    let cascaded = state.services.units.delete_unit(id).await?;
    Ok(Json(ApiResponse::success(Deleted::with_cascade(id, cascaded))))
}
