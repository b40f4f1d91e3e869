#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use serde_json::{json, Value};
use sgq_api::{
    auth::{navigation::permission_id, SignUpRequest, CONFIRM_PASSWORD_HEADER},
    config::AppConfig,
    db,
    events::{self, EventSender},
    logging::{discard_logger, AccessLog},
    services::users::PermissionSet,
    storage::{LocalObjectStorage, ObjectStorage},
    AppState,
};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin.sgq";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const DEFAULT_PASSWORD: &str = "secret1";

/// Application harness over a throw-away SQLite file and storage directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    admin_token: String,
    _dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("sgq_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.storage_dir = dir.path().join("storage").display().to_string();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let storage: Arc<dyn ObjectStorage> =
            Arc::new(LocalObjectStorage::new(cfg.storage_dir.clone(), None));

        let state = AppState::new(
            Arc::new(pool),
            cfg,
            Arc::new(EventSender::new(event_tx)),
            storage,
        );

        let router = sgq_api::app_router(state.clone(), AccessLog::new(discard_logger()));

        let mut app = Self {
            router,
            state,
            admin_token: String::new(),
            _dir: dir,
            _event_task: event_task,
        };

        let admin = app
            .state
            .auth
            .sign_up(SignUpRequest {
                username: ADMIN_USERNAME.to_string(),
                display_name: "Administrador".to_string(),
                password: ADMIN_PASSWORD.to_string(),
            })
            .await
            .expect("seed admin");
        let mut promoted = admin.into_active_model();
        promoted.is_admin = Set(true);
        promoted
            .update(app.state.db.as_ref())
            .await
            .expect("promote admin");

        app.admin_token = app.sign_in(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        app
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    /// Signs in through the HTTP API and returns the bearer token.
    pub async fn sign_in(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/sign-in",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status(), 200, "sign-in for {} failed", username);
        let body = response_json(response).await;
        body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    /// Creates a non-admin account holding the given menu paths and returns
    /// its token.
    pub async fn user_with_paths(&self, username: &str, paths: &[&str]) -> String {
        let user = self
            .state
            .auth
            .sign_up(SignUpRequest {
                username: username.to_string(),
                display_name: username.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
            })
            .await
            .expect("seed user");
        self.grant(user.id, paths).await;
        self.sign_in(username, DEFAULT_PASSWORD).await
    }

    pub async fn grant(&self, user_id: Uuid, paths: &[&str]) {
        self.state
            .services
            .users
            .replace_permissions(
                user_id,
                PermissionSet {
                    permissions: paths.iter().map(|p| permission_id(p)).collect(),
                },
            )
            .await
            .expect("grant permissions");
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        self.request_with_headers(method, uri, body, token, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Authenticated request as the seeded admin.
    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(self.admin_token())).await
    }

    /// Admin request carrying the step-up password confirmation.
    pub async fn admin_confirmed(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(
            method,
            uri,
            body,
            Some(self.admin_token()),
            &[(CONFIRM_PASSWORD_HEADER, ADMIN_PASSWORD)],
        )
        .await
    }

    /// Creates a unit and a toner through the API and returns their ids.
    pub async fn seed_unit_and_toner(&self) -> (Uuid, Uuid) {
        let unit = response_json(
            self.admin(Method::POST, "/api/v1/units", Some(json!({ "name": "Matriz" })))
                .await,
        )
        .await;
        let toner = response_json(
            self.admin(Method::POST, "/api/v1/toners", Some(toner_body("CF258A")))
                .await,
        )
        .await;
        (data_id(&unit), data_id(&toner))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub fn toner_body(model: &str) -> Value {
    json!({
        "model": model,
        "gross_weight": "850",
        "empty_weight": "350",
        "compatible_printers": "M404, M428",
        "color": "Black",
        "print_coverage": "5",
        "page_yield": 3000,
        "kind": "Compatible",
        "unit_price": "150"
    })
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn data_id(body: &Value) -> Uuid {
    body["data"]["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("no id in {}", body))
}

/// Reads a decimal serialized either as a JSON string or a number.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    use std::str::FromStr;
    match value {
        Value::String(s) => rust_decimal::Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => rust_decimal::Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {}", other),
    }
}
