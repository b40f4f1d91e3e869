use crate::{
    auth::{MenuCategory, Session},
    ApiResponse, ApiResult,
};
use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct NavigationView {
    /// Visible entries grouped by category, dashboard first
    #[schema(value_type = Object)]
    pub menu: Vec<MenuCategory>,
    /// Every path the session may open
    pub allowed_paths: Vec<String>,
}

impl NavigationView {
    pub fn of(session: &Session) -> Self {
        Self {
            menu: session.gate.menu(),
            allowed_paths: session
                .gate
                .visible_entries()
                .into_iter()
                .map(|entry| entry.path.to_string())
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/navigation",
    responses(
        (status = 200, description = "Menu entries the session's gate allows", body = ApiResponse<NavigationView>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "navigation"
)]
pub async fn navigation(session: Session) -> ApiResult<NavigationView> {
    Ok(Json(ApiResponse::success(NavigationView::of(&session))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::GateState;
    use chrono::Utc;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn session(gate: GateState) -> Session {
        Session {
            token_id: "t".into(),
            user_id: Uuid::new_v4(),
            username: "ana.silva".into(),
            display_name: "Ana".into(),
            is_admin: false,
            gate,
            issued_at: Utc::now(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn scoped_session_sees_dashboard_and_granted_paths() {
        let paths: BTreeSet<String> = ["/tco".to_string()].into_iter().collect();
        let view = NavigationView::of(&session(GateState::Scoped(paths)));
        assert_eq!(view.allowed_paths, vec!["/", "/tco"]);
        assert_eq!(view.menu.len(), 2);
    }

    #[test]
    fn unresolved_gate_shows_dashboard_only() {
        let view = NavigationView::of(&session(GateState::Loading));
        assert_eq!(view.allowed_paths, vec!["/"]);
    }
}
