/*!
 * # Health Check Module
 *
 * `GET /api/v1/health` answers without authentication. It pings the database
 * and reports uptime and the number of live sessions. A failed ping turns the
 * status to `down` and the HTTP status to 503.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::{db::DbPool, ApiResponse, AppState};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
    pub details: BTreeMap<String, HealthDetail>,
}

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Marks process start; call once from `main`.
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

fn uptime_seconds() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

impl HealthInfo {
    pub async fn probe(db: &DbPool, active_sessions: usize) -> Self {
        let database = match crate::db::check_connection(db).await {
            Ok(()) => HealthDetail {
                status: HealthStatus::Up,
                message: None,
            },
            Err(e) => {
                error!("Database health check failed: {}", e);
                HealthDetail {
                    status: HealthStatus::Down,
                    message: Some(e.to_string()),
                }
            }
        };

        let status = database.status;
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            uptime_seconds: uptime_seconds(),
            active_sessions,
            details: BTreeMap::from([("database".to_string(), database)]),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Up => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service and database are up", body = ApiResponse<HealthInfo>),
        (status = 503, description = "Database unreachable", body = ApiResponse<HealthInfo>)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthInfo>>) {
    let info = HealthInfo::probe(&state.db, state.auth.sessions().len()).await;
    (info.status_code(), Json(ApiResponse::success(info)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnected_database_reports_down() {
        let info = HealthInfo::probe(&DbPool::default(), 0).await;
        assert_eq!(info.status, HealthStatus::Down);
        assert_eq!(info.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(info.details["database"].message.is_some());
    }
}
