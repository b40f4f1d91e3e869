use crate::{
    commands::audits::{
        create_audit_form_command::CreateAuditFormCommand, record_audit_command::RecordAuditCommand,
        AuditFormInput,
    },
    entities::{audit_form, audit_record},
    handlers::common::SavedWithRows,
    services::{
        audits::{AuditFormDetail, AuditRecordDetail, AuditRecordRow},
        listing::ListFilter,
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
    path = "/api/v1/audit-forms",
    params(ListFilter),
    responses(
        (status = 200, description = "Audit form templates", body = ApiResponse<Vec<audit_form::Model>>)
    ),
    tag = "audits"
)]
pub async fn list_forms(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<audit_form::Model>> {
    let forms = state.services.audits.list_forms(&filter).await?;
    Ok(Json(ApiResponse::success(forms)))
}

#[utoipa::path(
    get,
    path = "/api/v1/audit-forms/:id",
    params(
        ("id" = Uuid, Path, description = "Audit form ID")
    ),
    responses(
        (status = 200, description = "Form with its sections and items in order", body = ApiResponse<AuditFormDetail>),
        (status = 404, description = "Audit form not found", body = crate::errors::ErrorResponse)
    ),
    tag = "audits"
)]
pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AuditFormDetail> {
    let form = state.services.audits.get_form(id).await?;
    Ok(Json(ApiResponse::success(form)))
}

#[utoipa::path(
    post,
    path = "/api/v1/audit-forms",
    request_body = AuditFormInput,
    responses(
        (status = 200, description = "Form, sections and items saved", body = ApiResponse<SavedWithRows<audit_form::Model>>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Partial write", body = crate::errors::ErrorResponse)
    ),
    tag = "audits"
)]
pub async fn create_form(
    State(state): State<AppState>,
    Json(input): Json<AuditFormInput>,
) -> ApiResult<SavedWithRows<audit_form::Model>> {
    let outcome = state
        .services
        .audits
        .create_form(CreateAuditFormCommand { input })
        .await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/audit-records",
    params(ListFilter),
    responses(
        (status = 200, description = "Audits performed, with form title and unit name", body = ApiResponse<Vec<AuditRecordRow>>)
    ),
    tag = "audits"
)]
pub async fn list_records(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> ApiResult<Vec<AuditRecordRow>> {
    let records = state.services.audits.list_records(&filter).await?;
    Ok(Json(ApiResponse::success(records)))
}

#[utoipa::path(
    get,
    path = "/api/v1/audit-records/:id",
    params(
        ("id" = Uuid, Path, description = "Audit record ID")
    ),
    responses(
        (status = 200, description = "Audit record with its responses", body = ApiResponse<AuditRecordDetail>),
        (status = 404, description = "Audit record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "audits"
)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AuditRecordDetail> {
    let record = state.services.audits.get_record(id).await?;
    Ok(Json(ApiResponse::success(record)))
}

/// Stores an audit performed against a form. Items without an answer are
/// recorded as conforming.
#[utoipa::path(
    post,
    path = "/api/v1/audit-records",
    request_body = RecordAuditCommand,
    responses(
        (status = 200, description = "Audit recorded", body = ApiResponse<SavedWithRows<audit_record::Model>>),
        (status = 400, description = "Answer for an item outside the form", body = crate::errors::ErrorResponse),
        (status = 404, description = "Form or unit not found", body = crate::errors::ErrorResponse)
    ),
    tag = "audits"
)]
pub async fn record_audit(
    State(state): State<AppState>,
    Json(command): Json<RecordAuditCommand>,
) -> ApiResult<SavedWithRows<audit_record::Model>> {
    let outcome = state.services.audits.record_audit(command).await?;
    Ok(Json(ApiResponse::success(outcome.into())))
}
