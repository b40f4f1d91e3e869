use crate::{
    commands::warranties::{
        create_warranty_claim_command::CreateWarrantyClaimCommand,
        update_warranty_claim_command::UpdateWarrantyClaimCommand, WarrantyClaimInput,
    },
    entities::warranty_claim,
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
    path = "/api/v1/warranties",
    params(ListFilter),
    responses(
        (status = 200, description = "Warranty claims listed, newest first", body = ApiResponse<Vec<warranty_claim::Model>>),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "warranties"
)]
pub async fn list_warranties(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<warranty_claim::Model>> {
    let claims = state.services.warranties.list_claims(&filter).await?;
    Ok(Json(ApiResponse::success(claims)))
}

#[utoipa::path(
    get,
    path = "/api/v1/warranties/:id",
    params(
        ("id" = Uuid, Path, description = "Warranty claim ID")
    ),
    responses(
        (status = 200, description = "Warranty claim fetched", body = ApiResponse<warranty_claim::Model>),
        (status = 404, description = "Warranty claim not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warranties"
)]
pub async fn get_warranty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<warranty_claim::Model> {
    let claim = state.services.warranties.get_claim(id).await?;
    Ok(Json(ApiResponse::success(claim)))
}

#[utoipa::path(
    post,
    path = "/api/v1/warranties",
    request_body = WarrantyClaimInput,
    responses(
        (status = 200, description = "Warranty claim registered", body = ApiResponse<warranty_claim::Model>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "warranties"
)]
pub async fn create_warranty(
    State(state): State<AppState>,
    Json(input): Json<WarrantyClaimInput>,
) -> ApiResult<warranty_claim::Model> {
    let created = state
        .services
        .warranties
        .create_claim(CreateWarrantyClaimCommand { input })
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

#[utoipa::path(
    put,
    path = "/api/v1/warranties/:id",
    request_body = WarrantyClaimInput,
    params(
        ("id" = Uuid, Path, description = "Warranty claim ID")
    ),
    responses(
        (status = 200, description = "Warranty claim updated", body = ApiResponse<warranty_claim::Model>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warranty claim not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warranties"
)]
pub async fn update_warranty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<WarrantyClaimInput>,
) -> ApiResult<warranty_claim::Model> {
    let updated = state
        .services
        .warranties
        .update_claim(UpdateWarrantyClaimCommand { id, input })
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/warranties/:id",
    params(
        ("id" = Uuid, Path, description = "Warranty claim ID")
    ),
    responses(
        (status = 200, description = "Warranty claim deleted", body = ApiResponse<Deleted>),
        (status = 401, description = "Password confirmation required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warranty claim not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warranties"
)]
pub async fn delete_warranty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    state.services.warranties.delete_claim(id).await?;
    Ok(Json(ApiResponse::success(Deleted::new(id))))
}

#[utoipa::path(
    get,
    path = "/api/v1/warranties/export",
    params(ListFilter),
    responses(
        (status = 200, description = "Filtered warranty claims as CSV", content_type = "text/csv", body = String)
    ),
    tag = "warranties"
)]
pub async fn export_warranties(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Response, ServiceError> {
    let claims = state.services.warranties.list_claims(&filter).await?;
    Ok(csv_response("warranties.csv", export::warranties_csv(&claims)?))
}
