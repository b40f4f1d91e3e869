//! User and permission administration. Every route here is admin-only.

use crate::{
    auth::AuthUser,
    handlers::common::Deleted,
    services::users::{Activation, PermissionSet, UserSummary},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Accounts by username", body = ApiResponse<Vec<UserSummary>>),
        (status = 403, description = "Administrators only", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserSummary>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// Turning an account off also ends its open sessions.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/:id/active",
    request_body = Activation,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Account enabled or disabled", body = ApiResponse<UserSummary>),
        (status = 400, description = "Own account", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn set_active(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
    Json(activation): Json<Activation>,
) -> ApiResult<UserSummary> {
    let user = state
        .services
        .users
        .set_active(admin.user_id, id, activation.active)
        .await?;
    if !user.active {
        state.auth.sessions().remove_user(id);
    }
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/:id",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Account deleted and signed out", body = ApiResponse<Deleted>),
        (status = 400, description = "Own account", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    state.services.users.delete_user(admin.user_id, id).await?;
    state.auth.sessions().remove_user(id);
    Ok(Json(ApiResponse::success(Deleted::new(id))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/:id/permissions",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user's menu permissions", body = ApiResponse<PermissionSet>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PermissionSet> {
    let set = state.services.users.permissions(id).await?;
    Ok(Json(ApiResponse::success(set)))
}

/// Replaces the whole permission set. Open sessions keep their gate until
/// the user signs in again.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/:id/permissions",
    request_body = PermissionSet,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Permission set replaced", body = ApiResponse<PermissionSet>),
        (status = 400, description = "Unknown permission identifier", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn replace_permissions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(set): Json<PermissionSet>,
) -> ApiResult<PermissionSet> {
    let saved = state.services.users.replace_permissions(id, set).await?;
    Ok(Json(ApiResponse::success(saved)))
}
