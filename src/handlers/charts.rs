use crate::{
    services::{
        charts::{self, ChartPoint},
        listing::ListFilter,
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
};

#[utoipa::path(
    get,
    path = "/api/v1/charts/warranties/by-month",
    params(ListFilter),
    responses(
        (status = 200, description = "Claim count and total value per month, oldest first", body = ApiResponse<Vec<ChartPoint>>),
        (status = 403, description = "Missing chart permission", body = crate::errors::ErrorResponse)
    ),
    tag = "charts"
)]
pub async fn warranties_by_month(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<ChartPoint>> {
    let claims = state.services.charts.claims(&filter).await?;
    Ok(Json(ApiResponse::success(charts::by_month(&claims))))
}

#[utoipa::path(
    get,
    path = "/api/v1/charts/warranties/by-supplier",
    params(ListFilter),
    responses(
        (status = 200, description = "Claim count and total value per supplier", body = ApiResponse<Vec<ChartPoint>>),
        (status = 403, description = "Missing chart permission", body = crate::errors::ErrorResponse)
    ),
    tag = "charts"
)]
pub async fn warranties_by_supplier(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<ChartPoint>> {
    let claims = state.services.charts.claims(&filter).await?;
    Ok(Json(ApiResponse::success(charts::by_supplier(&claims))))
}

#[utoipa::path(
    get,
    path = "/api/v1/charts/warranties/by-status",
    params(ListFilter),
    responses(
        (status = 200, description = "Claim count per status", body = ApiResponse<Vec<ChartPoint>>),
        (status = 403, description = "Missing chart permission", body = crate::errors::ErrorResponse)
    ),
    tag = "charts"
)]
pub async fn warranties_by_status(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<ChartPoint>> {
    let claims = state.services.charts.claims(&filter).await?;
    Ok(Json(ApiResponse::success(charts::by_status(&claims))))
}
