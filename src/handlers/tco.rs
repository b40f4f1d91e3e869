use crate::{
    commands::tco::{create_tco_command::CreateTcoCommand, update_tco_command::UpdateTcoCommand, TcoInput},
    entities::tco,
    handlers::common::{Deleted, SavedWithRows},
    services::{
        listing::ListFilter,
        tco::{TcoDetail, TcoTotals},
    },
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/tco",
    params(ListFilter),
    responses(
        (status = 200, description = "TCO headers listed, newest first", body = ApiResponse<Vec<tco::Model>>)
    ),
    tag = "tco"
)]
pub async fn list_tcos(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<tco::Model>> {
    let rows = state.services.tco.list_tcos(&filter).await?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tco/:id",
    params(
        ("id" = Uuid, Path, description = "TCO ID")
    ),
    responses(
        (status = 200, description = "TCO with its cost rows and totals", body = ApiResponse<TcoDetail>),
        (status = 404, description = "TCO not found", body = crate::errors::ErrorResponse)
    ),
    tag = "tco"
)]
pub async fn get_tco(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<TcoDetail> {
    let detail = state.services.tco.get_tco(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// Saves the header, then the operational and indirect cost rows.
///
/// A failure after the header is written answers 500 with the header id and
/// the collections already written; the header is not rolled back.
#[utoipa::path(
    post,
    path = "/api/v1/tco",
    request_body = TcoInput,
    responses(
        (status = 200, description = "TCO saved", body = ApiResponse<SavedWithRows<tco::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Partial write", body = crate::errors::ErrorResponse)
    ),
    tag = "tco"
)]
pub async fn create_tco(
    State(state): State<AppState>,
    Json(input): Json<TcoInput>,
) -> ApiResult<SavedWithRows<tco::Model>> {
    let outcome = state
        .services
        .tco
        .create_tco(CreateTcoCommand { input })
        .await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/tco/:id",
    request_body = TcoInput,
    params(
        ("id" = Uuid, Path, description = "TCO ID")
    ),
    responses(
        (status = 200, description = "TCO and its cost rows replaced", body = ApiResponse<SavedWithRows<tco::Model>>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "TCO not found", body = crate::errors::ErrorResponse)
    ),
    tag = "tco"
)]
pub async fn update_tco(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TcoInput>,
) -> ApiResult<SavedWithRows<tco::Model>> {
    let outcome = state
        .services
        .tco
        .update_tco(UpdateTcoCommand { id, input })
        .await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tco/:id",
    params(
        ("id" = Uuid, Path, description = "TCO ID")
    ),
    responses(
        (status = 200, description = "TCO and its cost rows deleted", body = ApiResponse<Deleted>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "TCO not found", body = crate::errors::ErrorResponse)
    ),
    tag = "tco"
)]
pub async fn delete_tco(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Deleted> {
    state.services.tco.delete_tco(id).await?;
    Ok(Json(ApiResponse::success(Deleted::new(id))))
}

#[utoipa::path(
    post,
    path = "/api/v1/tco/preview",
    request_body = TcoInput,
    responses(
        (status = 200, description = "Acquisition total and monthly cost totals", body = ApiResponse<TcoTotals>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "tco"
)]
pub async fn preview_tco(
    State(state): State<AppState>,
    Json(input): Json<TcoInput>,
) -> ApiResult<TcoTotals> {
    let totals = state.services.tco.preview(&input)?;
    Ok(Json(ApiResponse::success(totals)))
}
