/*!
 * # Authentication and Authorization Module
 *
 * Username and password sign-in against `app_users`, HS256 session tokens,
 * and the gates that sit in front of the registry routes:
 *
 * - `with_auth`: a live session is required
 * - `with_permission(path)`: the session's navigation gate must allow `path`
 * - `with_admin`: administrators only
 * - `with_step_up(path)`: the caller re-enters their password in
 *   `X-Confirm-Password` and must be allowed to see `path`
 * - `with_admin_step_up`: administrators only, with password confirmation
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{config::AppConfig, db::DbPool, entities::app_user, errors::ServiceError};

pub mod navigation;
pub mod password;
pub mod session;

pub use navigation::{GateState, MenuCategory, MenuEntry};
pub use session::{Session, SessionChange, SessionRegistry};

/// Header carrying the caller's password for step-up confirmation.
pub const CONFIRM_PASSWORD_HEADER: &str = "x-confirm-password";

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z]+\.[a-zA-Z]+$").unwrap();
}

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub admin: bool,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user data extracted from the session token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
    pub token_id: String,
}

impl From<&Session> for AuthUser {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username.clone(),
            display_name: session.display_name.clone(),
            is_admin: session.is_admin,
            token_id: session.token_id.clone(),
        }
    }
}

/// Type alias kept for handler signatures.
pub type AuthenticatedUser = AuthUser;

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_audience.clone(),
            cfg.jwt_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    /// `first.last`, letters only
    #[validate(regex(path = "USERNAME_RE", message = "username must look like first.last"))]
    pub username: String,
    #[validate(length(min = 1, max = 120))]
    pub display_name: String,
    #[validate(length(min = 6, message = "password must have at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignInResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AuthUser,
    #[schema(value_type = Object)]
    pub navigation: Vec<MenuCategory>,
}

/// Authentication service that handles sign-in and session tokens
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DbPool>,
    sessions: SessionRegistry,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DbPool>) -> Self {
        Self::with_registry(config, db, SessionRegistry::default())
    }

    pub fn with_registry(config: AuthConfig, db: Arc<DbPool>, sessions: SessionRegistry) -> Self {
        Self {
            config,
            db,
            sessions,
        }
    }

    /// Checks the credentials, resolves the navigation gate and opens a session.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignInResponse, AuthError> {
        let user = app_user::Entity::find()
            .filter(app_user::Column::Username.eq(username.trim()))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = password::verify_password(password, &user.password_hash)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        if !matches {
            warn!(%username, "sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.active {
            return Err(AuthError::InactiveUser);
        }

        let gate = navigation::resolve_gate(&self.db, &user).await;
        let (access_token, session) = self.issue_token(&user, gate)?;
        let response = SignInResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_expiration.as_secs() as i64,
            user: AuthUser::from(&session),
            navigation: session.gate.menu(),
        };

        self.sessions.insert(session);
        info!(user_id = %user.id, "user signed in");
        Ok(response)
    }

    /// Creates an active, non-admin account with no menu permissions.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<app_user::Model, ServiceError> {
        request.validate()?;

        let existing = app_user::Entity::find()
            .filter(app_user::Column::Username.eq(request.username.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Username {} is already taken",
                request.username
            )));
        }

        let user = app_user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(request.username),
            display_name: Set(request.display_name),
            password_hash: Set(password::hash_password(&request.password)?),
            active: Set(true),
            is_admin: Set(false),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    /// Ends the session for `token_id`. Ending an unknown session is a no-op.
    pub fn sign_out(&self, token_id: &str) -> Option<Session> {
        let session = self.sessions.remove(token_id);
        if let Some(session) = &session {
            info!(user_id = %session.user_id, "user signed out");
        }
        session
    }

    pub fn current_session(&self, token_id: &str) -> Option<Session> {
        self.sessions.get(token_id)
    }

    pub async fn current_user(&self, token_id: &str) -> Result<app_user::Model, AuthError> {
        let session = self
            .current_session(token_id)
            .ok_or(AuthError::RevokedToken)?;
        app_user::Entity::find_by_id(session.user_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionChange> {
        self.sessions.subscribe()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    fn issue_token(
        &self,
        user: &app_user::Model,
        gate: GateState,
    ) -> Result<(String, Session), AuthError> {
        let now = Utc::now();
        let expires_at = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.display_name.clone(),
            admin: user.is_admin,
            jti: jti.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        let session = Session {
            token_id: jti,
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            is_admin: user.is_admin,
            gate,
            issued_at: now,
            expires_at,
        };
        Ok((token, session))
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Resolves a bearer token to its live session.
    pub fn authenticate(&self, token: &str) -> Result<Session, AuthError> {
        let claims = self.validate_token(token)?;
        self.sessions
            .get(&claims.jti)
            .ok_or(AuthError::RevokedToken)
    }

    /// Step-up confirmation: the caller's own password must match.
    pub async fn confirm_password(&self, user_id: Uuid, password: &str) -> Result<(), AuthError> {
        let user = app_user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        match password::verify_password(password, &user.password_hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AuthError::ConfirmationFailed),
            Err(e) => Err(AuthError::InternalError(e.to_string())),
        }
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is inactive")]
    InactiveUser,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Session has ended")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Password confirmation required")]
    ConfirmationRequired,

    #[error("Password confirmation failed")]
    ConfirmationFailed,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            Self::InactiveUser => (
                StatusCode::FORBIDDEN,
                "AUTH_INACTIVE_USER",
                "User account is inactive".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_SESSION_ENDED",
                "Session has ended".to_string(),
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Token creation failed".to_string(),
            ),
            Self::ConfirmationRequired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_CONFIRMATION_REQUIRED",
                "Re-enter your password to confirm this action".to_string(),
            ),
            Self::ConfirmationFailed => (
                StatusCode::FORBIDDEN,
                "AUTH_CONFIRMATION_FAILED",
                "Password confirmation failed".to_string(),
            ),
            Self::UserNotFound => (
                StatusCode::NOT_FOUND,
                "AUTH_USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_DATABASE_ERROR",
                "Database error".to_string(),
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "authentication failure");
        }

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        let (status, _, message) = err.parts();
        match status {
            StatusCode::FORBIDDEN => ServiceError::Forbidden(message),
            StatusCode::NOT_FOUND => ServiceError::NotFound(message),
            StatusCode::INTERNAL_SERVER_ERROR => ServiceError::InternalError(err.to_string()),
            _ => ServiceError::AuthError(message),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

fn auth_service(request: &Request) -> Result<Arc<AuthService>, AuthError> {
    request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| AuthError::InternalError("Authentication service not available".into()))
}

fn session_of(request: &Request) -> Result<Session, AuthError> {
    request
        .extensions()
        .get::<Session>()
        .cloned()
        .ok_or(AuthError::MissingAuth)
}

/// Authentication middleware: resolves the bearer token to a live session
/// and stores both the [`Session`] and the [`AuthUser`] on the request.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, AuthError> {
    let service = auth_service(&request)?;
    let token = bearer_token(request.headers()).ok_or(AuthError::MissingAuth)?;
    let session = service.authenticate(token)?;

    debug!(user_id = %session.user_id, "request authenticated");
    let user = AuthUser::from(&session);
    request.extensions_mut().insert(user.clone());
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;
    // read back by the access log
    response.extensions_mut().insert(user);
    Ok(response)
}

/// Requires the session's navigation gate to allow `path`.
pub async fn permission_middleware(
    State(path): State<&'static str>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let session = session_of(&request)?;
    if !session.gate.allows(path) {
        return Err(AuthError::InsufficientPermissions);
    }
    Ok(next.run(request).await)
}

pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AuthError> {
    let session = session_of(&request)?;
    if !session.is_admin {
        return Err(AuthError::InsufficientPermissions);
    }
    Ok(next.run(request).await)
}

/// Step-up confirmation for edits and deletes on sensitive registries.
///
/// The caller must be an administrator or hold the permission for `path`,
/// and must send their own password in `X-Confirm-Password`.
pub async fn step_up_middleware(
    State(path): State<&'static str>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let service = auth_service(&request)?;
    let session = session_of(&request)?;

    if !session.is_admin && !session.gate.allows(path) {
        return Err(AuthError::InsufficientPermissions);
    }

    let password = request
        .headers()
        .get(CONFIRM_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::ConfirmationRequired)?;

    service.confirm_password(session.user_id, password).await?;
    debug!(user_id = %session.user_id, %path, "step-up confirmed");
    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_permission(self, path: &'static str) -> Self;
    fn with_admin(self) -> Self;
    fn with_step_up(self, path: &'static str) -> Self;
    fn with_admin_step_up(self) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_permission(self, path: &'static str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            path,
            permission_middleware,
        ))
        .with_auth()
    }

    fn with_admin(self) -> Self {
        self.layer(axum::middleware::from_fn(admin_middleware))
            .with_auth()
    }

    fn with_step_up(self, path: &'static str) -> Self {
        self.layer(axum::middleware::from_fn_with_state(path, step_up_middleware))
            .with_auth()
    }

    fn with_admin_step_up(self) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            navigation::DASHBOARD.path,
            step_up_middleware,
        ))
        .with_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let config = AuthConfig::new(
            "a-test-secret-that-is-long-enough-for-hs256".into(),
            "sgq-clients".into(),
            "sgq-api".into(),
            Duration::from_secs(3600),
        );
        AuthService::new(config, Arc::new(DbPool::default()))
    }

    fn user() -> app_user::Model {
        app_user::Model {
            id: Uuid::new_v4(),
            username: "ana.silva".into(),
            display_name: "Ana Silva".into(),
            password_hash: String::new(),
            active: true,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn issued_token_validates_and_maps_to_session() {
        let service = service();
        let user = user();
        let (token, session) = service.issue_token(&user, GateState::None).unwrap();
        service.sessions.insert(session.clone());

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.jti, session.token_id);
        assert_eq!(service.authenticate(&token).unwrap().user_id, user.id);
    }

    #[test]
    fn signed_out_token_is_rejected() {
        let service = service();
        let (token, session) = service.issue_token(&user(), GateState::None).unwrap();
        service.sessions.insert(session.clone());
        service.sign_out(&session.token_id);

        assert!(matches!(
            service.authenticate(&token),
            Err(AuthError::RevokedToken)
        ));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let (token, _) = service().issue_token(&user(), GateState::None).unwrap();
        let mut other = service();
        other.config.jwt_secret = "another-secret-that-is-also-long-enough".into();
        assert!(matches!(
            other.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn sign_up_rules() {
        let ok = SignUpRequest {
            username: "ana.silva".into(),
            display_name: "Ana".into(),
            password: "secret".into(),
        };
        assert!(ok.validate().is_ok());

        let bad_name = SignUpRequest {
            username: "ana".into(),
            ..ok.clone()
        };
        assert!(bad_name.validate().is_err());

        let short_password = SignUpRequest {
            password: "12345".into(),
            ..ok
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
