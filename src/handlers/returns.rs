use crate::{
    calculations::ReturnFigures,
    commands::returns::{
        record_returned_unit_command::RecordReturnedUnitCommand,
        update_returned_unit_command::UpdateReturnedUnitCommand, ReturnedUnitInput,
    },
    entities::returned_unit,
    errors::ServiceError,
    handlers::common::{csv_response, Deleted},
    services::{
        export,
        listing::ListFilter,
        returns::{ReturnPreviewRequest, ReturnedUnitRow},
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/returned-units",
    params(ListFilter),
    responses(
        (status = 200, description = "Returned units with toner model and unit name", body = ApiResponse<Vec<ReturnedUnitRow>>),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse)
    ),
    tag = "returned-units"
)]
pub async fn list_returned_units(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<ReturnedUnitRow>> {
    let rows = state.services.returns.list_returned_units(&filter).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/returned-units/:id",
    params(
        ("id" = Uuid, Path, description = "Returned unit ID")
    ),
    responses(
        (status = 200, description = "Returned unit fetched", body = ApiResponse<returned_unit::Model>),
        (status = 404, description = "Returned unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "returned-units"
)]
pub async fn get_returned_unit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<returned_unit::Model> {
    let record = state.services.returns.get_returned_unit(id).await?;
    Ok(Json(ApiResponse::success(record)))
}

#[utoipa::path(
    post,
    path = "/api/v1/returned-units",
    request_body = ReturnedUnitInput,
    responses(
        (status = 200, description = "Returned unit recorded with derived figures", body = ApiResponse<returned_unit::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Toner or unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "returned-units"
)]
pub async fn record_returned_unit(
    State(state): State<AppState>,
    Json(input): Json<ReturnedUnitInput>,
) -> ApiResult<returned_unit::Model> {
    let created = state
        .services
        .returns
        .record_returned_unit(RecordReturnedUnitCommand { input })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/returned-units/:id",
    request_body = ReturnedUnitInput,
    params(
        ("id" = Uuid, Path, description = "Returned unit ID")
    ),
    responses(
        (status = 200, description = "Returned unit updated", body = ApiResponse<returned_unit::Model>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Returned unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "returned-units"
)]
pub async fn update_returned_unit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReturnedUnitInput>,
) -> ApiResult<returned_unit::Model> {
    let updated = state
        .services
        .returns
        .update_returned_unit(UpdateReturnedUnitCommand { id, input })
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/returned-units/:id",
    params(
        ("id" = Uuid, Path, description = "Returned unit ID")
    ),
    responses(
        (status = 200, description = "Returned unit deleted", body = ApiResponse<Deleted>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Returned unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "returned-units"
)]
pub async fn delete_returned_unit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    state.services.returns.delete_returned_unit(id).await?;
    Ok(Json(ApiResponse::success(Deleted::new(id))))
}

/// Remaining weight, pages, usable percentage, suggested destination and
/// recovered value for a return that has not been saved yet.
#[utoipa::path(
    post,
    path = "/api/v1/returned-units/preview",
    request_body = ReturnPreviewRequest,
    responses(
        (status = 200, description = "Derived figures", body = ApiResponse<ReturnFigures>),
        (status = 404, description = "Toner not found", body = crate::errors::ErrorResponse)
    ),
    tag = "returned-units"
)]
pub async fn preview_returned_unit(
    State(state): State<AppState>,
    Json(request): Json<ReturnPreviewRequest>,
) -> ApiResult<ReturnFigures> {
    let figures = state.services.returns.preview(&request).await?;
    Ok(Json(ApiResponse::success(figures)))
}

#[utoipa::path(
    get,
    path = "/api/v1/returned-units/export",
    params(ListFilter),
    responses(
        (status = 200, description = "Filtered returned units as CSV", content_type = "text/csv", body = String)
    ),
    tag = "returned-units"
)]
pub async fn export_returned_units(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Response, ServiceError> {
    let rows = state.services.returns.list_returned_units(&filter).await?;
    Ok(csv_response(
        "returned-units.csv",
        export::returned_units_csv(&rows)?,
    ))
}
