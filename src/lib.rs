//! SGQ API Library
//!
//! Back-office for a quality-management team: toner and unit registries,
//! returned cartridges, warranty claims, non-conformities, TCO analyses,
//! audits, stock movements and versioned work instructions.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod calculations;
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod storage;
pub mod tracing;

use axum::{
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::ToSchema;

use crate::auth::navigation::paths;
use crate::auth::{AuthRouterExt, AuthService};
use crate::db::DbPool;
use crate::events::EventSender;
use crate::logging::AccessLog;
use crate::storage::ObjectStorage;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    /// Wires the service layer over one pool, one event channel and one store.
    pub fn new(
        db: Arc<DbPool>,
        config: config::AppConfig,
        event_sender: Arc<EventSender>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(
            auth::AuthConfig::from(&config),
            db.clone(),
        ));
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), storage.clone());
        Self {
            db,
            config,
            event_sender,
            services,
            auth,
            storage,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// Registry routes: reads need a session, creates need the Cadastro/Registro
// permission, edits and deletes need step-up against the Consulta page.
pub fn api_v1_routes() -> Router<AppState> {
    // Toners
    let toners_read = Router::new()
        .route("/toners", get(handlers::toners::list_toners))
        .route("/toners/export", get(handlers::toners::export_toners))
        .route("/toners/:id", get(handlers::toners::get_toner))
        .with_auth();

    let toners_create = Router::new()
        .route("/toners", post(handlers::toners::create_toner))
        .route("/toners/preview", post(handlers::toners::preview_toner))
        .with_permission(paths::TONERS);

    let toners_edit = Router::new()
        .route(
            "/toners/:id",
            put(handlers::toners::update_toner).delete(handlers::toners::delete_toner),
        )
        .with_step_up(paths::QUERY_TONERS);

    // Units
    let units_read = Router::new()
        .route("/units", get(handlers::units::list_units))
        .with_auth();

    let units_create = Router::new()
        .route("/units", post(handlers::units::create_unit))
        .with_permission(paths::UNITS);

    let units_edit = Router::new()
        .route(
            "/units/:id",
            put(handlers::units::rename_unit).delete(handlers::units::delete_unit),
        )
        .with_step_up(paths::QUERY_UNITS);

    // Returned units
    let returns_read = Router::new()
        .route("/returned-units", get(handlers::returns::list_returned_units))
        .route(
            "/returned-units/export",
            get(handlers::returns::export_returned_units),
        )
        .route("/returned-units/:id", get(handlers::returns::get_returned_unit))
        .with_auth();

    let returns_create = Router::new()
        .route(
            "/returned-units",
            post(handlers::returns::record_returned_unit),
        )
        .route(
            "/returned-units/preview",
            post(handlers::returns::preview_returned_unit),
        )
        .with_permission(paths::RETURNS);

    let returns_edit = Router::new()
        .route(
            "/returned-units/:id",
            put(handlers::returns::update_returned_unit)
                .delete(handlers::returns::delete_returned_unit),
        )
        .with_step_up(paths::QUERY_RETURNS);

    // Warranty claims
    let warranties_read = Router::new()
        .route("/warranties", get(handlers::warranties::list_warranties))
        .route(
            "/warranties/export",
            get(handlers::warranties::export_warranties),
        )
        .route("/warranties/:id", get(handlers::warranties::get_warranty))
        .with_auth();

    let warranties_create = Router::new()
        .route("/warranties", post(handlers::warranties::create_warranty))
        .with_permission(paths::WARRANTIES);

    let warranties_edit = Router::new()
        .route(
            "/warranties/:id",
            put(handlers::warranties::update_warranty)
                .delete(handlers::warranties::delete_warranty),
        )
        .with_step_up(paths::QUERY_WARRANTIES);

    // Non-conformities
    let nc_read = Router::new()
        .route(
            "/non-conformities",
            get(handlers::nonconformities::list_non_conformities),
        )
        .route(
            "/non-conformities/export",
            get(handlers::nonconformities::export_non_conformities),
        )
        .route(
            "/non-conformities/:id",
            get(handlers::nonconformities::get_non_conformity),
        )
        .with_auth();

    let nc_create = Router::new()
        .route(
            "/non-conformities",
            post(handlers::nonconformities::open_non_conformity),
        )
        .route(
            "/non-conformities/next-number",
            get(handlers::nonconformities::next_number),
        )
        .with_permission(paths::NC);

    let nc_edit = Router::new()
        .route(
            "/non-conformities/:id",
            put(handlers::nonconformities::update_non_conformity)
                .delete(handlers::nonconformities::delete_non_conformity),
        )
        .route(
            "/non-conformities/:id/status",
            post(handlers::nonconformities::change_status),
        )
        .with_step_up(paths::QUERY_NC);

    // TCO
    let tco_read = Router::new()
        .route("/tco", get(handlers::tco::list_tcos))
        .route("/tco/:id", get(handlers::tco::get_tco))
        .with_auth();

    let tco_create = Router::new()
        .route("/tco", post(handlers::tco::create_tco))
        .route("/tco/preview", post(handlers::tco::preview_tco))
        .with_permission(paths::TCO);

    let tco_edit = Router::new()
        .route(
            "/tco/:id",
            put(handlers::tco::update_tco).delete(handlers::tco::delete_tco),
        )
        .with_step_up(paths::QUERY_TCO);

    // Audits
    let audits_read = Router::new()
        .route("/audit-forms", get(handlers::audits::list_forms))
        .route("/audit-forms/:id", get(handlers::audits::get_form))
        .route("/audit-records", get(handlers::audits::list_records))
        .route("/audit-records/:id", get(handlers::audits::get_record))
        .with_auth();

    let audit_forms_create = Router::new()
        .route("/audit-forms", post(handlers::audits::create_form))
        .with_permission(paths::AUDIT_FORMS);

    let audit_records_create = Router::new()
        .route("/audit-records", post(handlers::audits::record_audit))
        .with_permission(paths::AUDITS);

    // Stock movements have no menu entry; step-up is checked against the dashboard
    let movements = Router::new()
        .route(
            "/movements",
            get(handlers::movements::list_movements).post(handlers::movements::record_movement),
        )
        .route("/movements/export", get(handlers::movements::export_movements))
        .with_auth();

    let movements_edit = Router::new()
        .route(
            "/movements/:id",
            put(handlers::movements::update_movement).delete(handlers::movements::delete_movement),
        )
        .with_step_up(auth::navigation::DASHBOARD.path);

    // Work instructions
    let instructions = Router::new()
        .route(
            "/work-instructions",
            get(handlers::work_instructions::list_instructions)
                .post(handlers::work_instructions::create_instruction),
        )
        .route(
            "/work-instructions/:id/versions",
            post(handlers::work_instructions::add_version),
        )
        .route(
            "/work-instructions/versions/:id/views",
            post(handlers::work_instructions::record_view),
        )
        .with_auth();

    let instructions_delete = Router::new()
        .route(
            "/work-instructions/:id",
            delete(handlers::work_instructions::delete_instruction),
        )
        .with_admin_step_up();

    let charts = Router::new()
        .route(
            "/charts/warranties/by-month",
            get(handlers::charts::warranties_by_month),
        )
        .route(
            "/charts/warranties/by-supplier",
            get(handlers::charts::warranties_by_supplier),
        )
        .route(
            "/charts/warranties/by-status",
            get(handlers::charts::warranties_by_status),
        )
        .with_permission(paths::CHARTS);

    let admin = Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/:id", delete(handlers::admin::delete_user))
        .route("/admin/users/:id/active", put(handlers::admin::set_active))
        .route(
            "/admin/users/:id/permissions",
            get(handlers::admin::get_permissions).put(handlers::admin::replace_permissions),
        )
        .with_admin();

    let auth_public = Router::new()
        .route("/auth/sign-in", post(handlers::auth::sign_in))
        .route("/auth/sign-up", post(handlers::auth::sign_up));

    let auth_session = Router::new()
        .route("/auth/sign-out", post(handlers::auth::sign_out))
        .route("/auth/session", get(handlers::auth::current_session))
        .route("/auth/me", get(handlers::auth::me))
        .route("/navigation", get(handlers::navigation::navigation))
        .with_auth();

    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth_public)
        .merge(auth_session)
        .merge(toners_read)
        .merge(toners_create)
        .merge(toners_edit)
        .merge(units_read)
        .merge(units_create)
        .merge(units_edit)
        .merge(returns_read)
        .merge(returns_create)
        .merge(returns_edit)
        .merge(warranties_read)
        .merge(warranties_create)
        .merge(warranties_edit)
        .merge(nc_read)
        .merge(nc_create)
        .merge(nc_edit)
        .merge(tco_read)
        .merge(tco_create)
        .merge(tco_edit)
        .merge(audits_read)
        .merge(audit_forms_create)
        .merge(audit_records_create)
        .merge(movements)
        .merge(movements_edit)
        .merge(instructions)
        .merge(instructions_delete)
        .merge(charts)
        .merge(admin)
}

/// Full HTTP application: API, metrics, OpenAPI document and stored files.
///
/// Layer order, outermost first: request id, access log, HTTP tracing,
/// metrics, auth service injection.
pub fn app_router(state: AppState, access_log: Arc<AccessLog>) -> Router {
    let files = ServeDir::new(state.config.storage_dir.clone());

    Router::new()
        .route("/metrics", get(crate::metrics::metrics_handler))
        .route("/api-docs/openapi.json", get(crate::openapi::openapi_json))
        .nest("/api/v1", api_v1_routes())
        .nest_service("/files", files)
        .layer(Extension(state.auth.clone()))
        .layer(axum::middleware::from_fn(crate::metrics::metrics_middleware))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn_with_state(
            access_log,
            crate::logging::access_log_middleware,
        ))
        .layer(axum::middleware::from_fn(
            crate::middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::auth::{AuthRouterExt, AuthService, AuthUser, Session};
    pub use crate::db::DbPool;
    pub use crate::errors::*;
    pub use crate::events::{Event, EventSender};
    pub use crate::{ApiResponse, ApiResult, AppState};
}
