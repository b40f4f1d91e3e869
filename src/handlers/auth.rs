use crate::{
    auth::{AuthUser, Session, SignInRequest, SignInResponse, SignUpRequest},
    errors::ServiceError,
    services::users::UserSummary,
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    pub user: AuthUser,
    #[schema(value_type = Object)]
    pub gate: crate::auth::GateState,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            user: AuthUser::from(&session),
            gate: session.gate,
            issued_at: session.issued_at,
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignedOut {
    pub signed_out: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Session opened", body = ApiResponse<SignInResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
        (status = 403, description = "Inactive account", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<SignInResponse> {
    request.validate()?;
    let response = state
        .auth
        .sign_in(&request.username, &request.password)
        .await?;
    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Account created without menu permissions", body = ApiResponse<UserSummary>),
        (status = 400, description = "Invalid username or password", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<UserSummary> {
    let user = state.auth.sign_up(request).await?;
    Ok(Json(ApiResponse::success(UserSummary::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    responses(
        (status = 200, description = "Session ended", body = ApiResponse<SignedOut>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn sign_out(State(state): State<AppState>, user: AuthUser) -> ApiResult<SignedOut> {
    let ended = state.auth.sign_out(&user.token_id).is_some();
    info!(user_id = %user.user_id, ended, "sign-out requested");
    Ok(Json(ApiResponse::success(SignedOut { signed_out: ended })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    responses(
        (status = 200, description = "The caller's live session", body = ApiResponse<SessionView>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn current_session(session: Session) -> ApiResult<SessionView> {
    Ok(Json(ApiResponse::success(SessionView::from(session))))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "The caller's account", body = ApiResponse<UserSummary>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<UserSummary> {
    let account = state
        .auth
        .current_user(&user.token_id)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(ApiResponse::success(UserSummary::from(account))))
}
