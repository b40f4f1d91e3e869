use crate::{
    commands::movements::{
        record_stock_movement_command::RecordStockMovementCommand,
        update_stock_movement_command::UpdateStockMovementCommand, StockMovementInput,
    },
    entities::stock_movement,
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
    path = "/api/v1/movements",
    params(ListFilter),
    responses(
        (status = 200, description = "Stock movements listed, newest first", body = ApiResponse<Vec<stock_movement::Model>>)
    ),
    tag = "movements"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<stock_movement::Model>> {
    let movements = state.services.movements.list(&filter).await?;
    Ok(Json(ApiResponse::success(movements)))
}

#[utoipa::path(
    get,
    path = "/api/v1/movements/export",
    params(ListFilter),
    responses(
        (status = 200, description = "Filtered stock movements as CSV", content_type = "text/csv", body = String)
    ),
    tag = "movements"
)]
pub async fn export_movements(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Response, ServiceError> {
    let movements = state.services.movements.list(&filter).await?;
    Ok(csv_response("movements.csv", export::movements_csv(&movements)?))
}

#[utoipa::path(
    post,
    path = "/api/v1/movements",
    request_body = StockMovementInput,
    responses(
        (status = 200, description = "Stock movement recorded", body = ApiResponse<stock_movement::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn record_movement(
    State(state): State<AppState>,
    Json(input): Json<StockMovementInput>,
) -> ApiResult<stock_movement::Model> {
    let created = state
        .services
        .movements
        .record(RecordStockMovementCommand { input })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/movements/:id",
    request_body = StockMovementInput,
    params(
        ("id" = Uuid, Path, description = "Stock movement ID")
    ),
    responses(
        (status = 200, description = "Stock movement updated", body = ApiResponse<stock_movement::Model>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stock movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn update_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StockMovementInput>,
) -> ApiResult<stock_movement::Model> {
    let updated = state
        .services
        .movements
        .update(UpdateStockMovementCommand { id, input })
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/movements/:id",
    params(
        ("id" = Uuid, Path, description = "Stock movement ID")
    ),
    responses(
        (status = 200, description = "Stock movement deleted", body = ApiResponse<Deleted>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Stock movement not found", body = crate::errors::ErrorResponse)
    ),
    tag = "movements"
)]
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    state.services.movements.delete(id).await?;
    Ok(Json(ApiResponse::success(Deleted::new(id))))
}
