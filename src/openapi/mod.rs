use axum::response::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SGQ API",
        version = "1.0.0",
        description = r#"
# Quality management back-office

Registries for toners, units, returned units, warranty claims,
non-conformities, TCO analyses, audits, stock movements and work
instructions.

## Authentication

Sign in at `/api/v1/auth/sign-in` and send the token on every other call:

```
Authorization: Bearer <token>
```

Creating records needs the matching menu permission. Editing or deleting
records on a sensitive registry also needs the caller's own password in the
`X-Confirm-Password` header.

## Lists

List endpoints take `from` and `to` (inclusive creation dates) and a
case-insensitive `search` matched against every displayed column.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Sign-in, sign-up and sessions"),
        (name = "navigation", description = "Menu entries allowed for the session"),
        (name = "toners", description = "Toner catalog"),
        (name = "units", description = "Sites and branches"),
        (name = "returned-units", description = "Returned toner cartridges"),
        (name = "warranties", description = "Warranty claims"),
        (name = "non-conformities", description = "Non-conformity reports"),
        (name = "tco", description = "Total cost of ownership analyses"),
        (name = "audits", description = "Audit templates and performed audits"),
        (name = "movements", description = "Stock movements"),
        (name = "work-instructions", description = "Versioned work instruction documents"),
        (name = "charts", description = "Warranty claim aggregates"),
        (name = "admin", description = "User permission administration"),
        (name = "health", description = "Health check")
    ),
    paths(
        crate::handlers::auth::sign_in,
        crate::handlers::auth::sign_up,
        crate::handlers::auth::sign_out,
        crate::handlers::auth::current_session,
        crate::handlers::auth::me,
        crate::handlers::navigation::navigation,

        crate::handlers::toners::list_toners,
        crate::handlers::toners::get_toner,
        crate::handlers::toners::create_toner,
        crate::handlers::toners::update_toner,
        crate::handlers::toners::delete_toner,
        crate::handlers::toners::preview_toner,
        crate::handlers::toners::export_toners,

        crate::handlers::units::list_units,
        crate::handlers::units::create_unit,
        crate::handlers::units::rename_unit,
        crate::handlers::units::delete_unit,

        crate::handlers::returns::list_returned_units,
        crate::handlers::returns::get_returned_unit,
        crate::handlers::returns::record_returned_unit,
        crate::handlers::returns::update_returned_unit,
        crate::handlers::returns::delete_returned_unit,
        crate::handlers::returns::preview_returned_unit,
        crate::handlers::returns::export_returned_units,

        crate::handlers::warranties::list_warranties,
        crate::handlers::warranties::get_warranty,
        crate::handlers::warranties::create_warranty,
        crate::handlers::warranties::update_warranty,
        crate::handlers::warranties::delete_warranty,
        crate::handlers::warranties::export_warranties,

        crate::handlers::nonconformities::next_number,
        crate::handlers::nonconformities::list_non_conformities,
        crate::handlers::nonconformities::export_non_conformities,
        crate::handlers::nonconformities::get_non_conformity,
        crate::handlers::nonconformities::open_non_conformity,
        crate::handlers::nonconformities::update_non_conformity,
        crate::handlers::nonconformities::change_status,
        crate::handlers::nonconformities::delete_non_conformity,

        crate::handlers::tco::list_tcos,
        crate::handlers::tco::get_tco,
        crate::handlers::tco::create_tco,
        crate::handlers::tco::update_tco,
        crate::handlers::tco::delete_tco,
        crate::handlers::tco::preview_tco,

        crate::handlers::audits::list_forms,
        crate::handlers::audits::get_form,
        crate::handlers::audits::create_form,
        crate::handlers::audits::list_records,
        crate::handlers::audits::get_record,
        crate::handlers::audits::record_audit,

        crate::handlers::movements::list_movements,
        crate::handlers::movements::export_movements,
        crate::handlers::movements::record_movement,
        crate::handlers::movements::update_movement,
        crate::handlers::movements::delete_movement,

        crate::handlers::work_instructions::list_instructions,
        crate::handlers::work_instructions::create_instruction,
        crate::handlers::work_instructions::add_version,
        crate::handlers::work_instructions::record_view,
        crate::handlers::work_instructions::delete_instruction,

        crate::handlers::charts::warranties_by_month,
        crate::handlers::charts::warranties_by_supplier,
        crate::handlers::charts::warranties_by_status,

        crate::handlers::admin::list_users,
        crate::handlers::admin::set_active,
        crate::handlers::admin::delete_user,
        crate::handlers::admin::get_permissions,
        crate::handlers::admin::replace_permissions,

        crate::health::health_check,
    ),
    components(
        schemas(
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// `GET /api-docs/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
