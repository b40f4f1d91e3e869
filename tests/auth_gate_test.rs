//! Sign-in, sessions and the navigation/permission gate in front of the
//! registry routes.

mod common;

use axum::http::Method;
use common::{response_json, toner_body, TestApp, ADMIN_USERNAME, DEFAULT_PASSWORD};
use serde_json::json;
use sgq_api::auth::{
    navigation::{paths, permission_id},
    CONFIRM_PASSWORD_HEADER,
};

#[tokio::test]
async fn registry_routes_require_a_session() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/toners", None, None).await;
    assert_eq!(response.status(), 401);

    let response = app
        .request(Method::GET, "/api/v1/toners", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn wrong_password_is_rejected_at_sign_in() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/sign-in",
            Some(json!({ "username": ADMIN_USERNAME, "password": "nope-nope" })),
            None,
        )
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn sign_up_validates_username_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let bad = app
        .request(
            Method::POST,
            "/api/v1/auth/sign-up",
            Some(json!({ "username": "ana", "display_name": "Ana", "password": "secret1" })),
            None,
        )
        .await;
    assert_eq!(bad.status(), 400);

    let body = json!({ "username": "ana.silva", "display_name": "Ana", "password": "secret1" });
    let created = app
        .request(Method::POST, "/api/v1/auth/sign-up", Some(body.clone()), None)
        .await;
    assert_eq!(created.status(), 200);
    let created = response_json(created).await;
    assert_eq!(created["data"]["is_admin"], false);
    assert!(created["data"].get("password_hash").is_none());

    let duplicate = app
        .request(Method::POST, "/api/v1/auth/sign-up", Some(body), None)
        .await;
    assert_eq!(duplicate.status(), 409);
}

#[tokio::test]
async fn new_account_sees_only_the_dashboard() {
    let app = TestApp::new().await;
    let token = app.user_with_paths("joao.souza", &[]).await;

    let nav = response_json(
        app.request(Method::GET, "/api/v1/navigation", None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(nav["data"]["allowed_paths"], json!(["/"]));

    let create = app
        .request(
            Method::POST,
            "/api/v1/toners",
            Some(toner_body("CF258A")),
            Some(&token),
        )
        .await;
    assert_eq!(create.status(), 403);

    // reads only need a session
    let list = app
        .request(Method::GET, "/api/v1/toners", None, Some(&token))
        .await;
    assert_eq!(list.status(), 200);
}

#[tokio::test]
async fn menu_permission_unlocks_only_its_registry() {
    let app = TestApp::new().await;
    let token = app
        .user_with_paths("maria.lima", &[paths::TONERS, paths::CHARTS])
        .await;

    let nav = response_json(
        app.request(Method::GET, "/api/v1/navigation", None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(
        nav["data"]["allowed_paths"],
        json!(["/", paths::TONERS, paths::CHARTS])
    );

    let toner = app
        .request(
            Method::POST,
            "/api/v1/toners",
            Some(toner_body("CF258A")),
            Some(&token),
        )
        .await;
    assert_eq!(toner.status(), 200);

    let unit = app
        .request(
            Method::POST,
            "/api/v1/units",
            Some(json!({ "name": "Matriz" })),
            Some(&token),
        )
        .await;
    assert_eq!(unit.status(), 403);

    let chart = app
        .request(
            Method::GET,
            "/api/v1/charts/warranties/by-status",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(chart.status(), 200);
}

#[tokio::test]
async fn step_up_needs_the_consulta_permission_and_the_callers_password() {
    let app = TestApp::new().await;
    let toner = response_json(
        app.admin(Method::POST, "/api/v1/toners", Some(toner_body("CF258A")))
            .await,
    )
    .await;
    let uri = format!("/api/v1/toners/{}", common::data_id(&toner));

    let registrar = app.user_with_paths("carla.dias", &[paths::TONERS]).await;
    let no_consulta = app
        .request_with_headers(
            Method::PUT,
            &uri,
            Some(toner_body("CF258X")),
            Some(&registrar),
            &[(CONFIRM_PASSWORD_HEADER, DEFAULT_PASSWORD)],
        )
        .await;
    assert_eq!(no_consulta.status(), 403);

    let reviewer = app
        .user_with_paths("paulo.reis", &[paths::QUERY_TONERS])
        .await;
    let missing = app
        .request(Method::PUT, &uri, Some(toner_body("CF258X")), Some(&reviewer))
        .await;
    assert_eq!(missing.status(), 401);

    let wrong = app
        .request_with_headers(
            Method::PUT,
            &uri,
            Some(toner_body("CF258X")),
            Some(&reviewer),
            &[(CONFIRM_PASSWORD_HEADER, "not-my-password")],
        )
        .await;
    assert_eq!(wrong.status(), 403);

    let confirmed = app
        .request_with_headers(
            Method::PUT,
            &uri,
            Some(toner_body("CF258X")),
            Some(&reviewer),
            &[(CONFIRM_PASSWORD_HEADER, DEFAULT_PASSWORD)],
        )
        .await;
    assert_eq!(confirmed.status(), 200);
    let body = response_json(confirmed).await;
    assert_eq!(body["data"]["model"], "CF258X");
}

#[tokio::test]
async fn admin_routes_are_closed_to_regular_users() {
    let app = TestApp::new().await;
    let token = app
        .user_with_paths("rita.alves", &[paths::TONERS])
        .await;

    let response = app
        .request(Method::GET, "/api/v1/admin/users", None, Some(&token))
        .await;
    assert_eq!(response.status(), 403);

    let users = response_json(app.admin(Method::GET, "/api/v1/admin/users", None).await).await;
    assert_eq!(users["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn admin_replaces_permissions_and_new_sessions_pick_them_up() {
    let app = TestApp::new().await;
    app.user_with_paths("bruno.melo", &[]).await;

    let users = response_json(app.admin(Method::GET, "/api/v1/admin/users", None).await).await;
    let bruno = users["data"]
        .as_array()
        .and_then(|rows| rows.iter().find(|u| u["username"] == "bruno.melo"))
        .expect("seeded user")
        .clone();
    let uri = format!("/api/v1/admin/users/{}/permissions", bruno["id"].as_str().unwrap());

    let unknown = app
        .admin(
            Method::PUT,
            &uri,
            Some(json!({ "permissions": ["menu_nothing_here"] })),
        )
        .await;
    assert_eq!(unknown.status(), 400);

    let replaced = app
        .admin(
            Method::PUT,
            &uri,
            Some(json!({ "permissions": [permission_id(paths::TCO), permission_id(paths::TCO)] })),
        )
        .await;
    assert_eq!(replaced.status(), 200);
    let replaced = response_json(replaced).await;
    assert_eq!(replaced["data"]["permissions"], json!([permission_id(paths::TCO)]));

    let token = app.sign_in("bruno.melo", DEFAULT_PASSWORD).await;
    let nav = response_json(
        app.request(Method::GET, "/api/v1/navigation", None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(nav["data"]["allowed_paths"], json!(["/", paths::TCO]));
}

#[tokio::test]
async fn sign_out_ends_the_session() {
    let app = TestApp::new().await;
    let token = app.user_with_paths("lucas.nunes", &[]).await;

    let me = response_json(
        app.request(Method::GET, "/api/v1/auth/me", None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(me["data"]["username"], "lucas.nunes");

    let out = response_json(
        app.request(Method::POST, "/api/v1/auth/sign-out", None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(out["data"]["signed_out"], true);

    let after = app
        .request(Method::GET, "/api/v1/auth/session", None, Some(&token))
        .await;
    assert_eq!(after.status(), 401);
}

#[tokio::test]
async fn public_endpoints_answer_without_a_token() {
    let app = TestApp::new().await;

    let health = app.request(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(health.status(), 200);
    let health = response_json(health).await;
    assert_eq!(health["data"]["status"], "up");

    let docs = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(docs.status(), 200);

    let metrics = app.request(Method::GET, "/metrics", None, None).await;
    assert_eq!(metrics.status(), 200);
}

#[tokio::test]
async fn request_id_is_echoed_back() {
    let app = TestApp::new().await;

    let response = app
        .request_with_headers(
            Method::GET,
            "/api/v1/health",
            None,
            None,
            &[("x-request-id", "trace-42")],
        )
        .await;
    assert_eq!(response.headers()["x-request-id"], "trace-42");
    let body = response_json(response).await;
    assert_eq!(body["meta"]["request_id"], "trace-42");
}

async fn user_id(app: &TestApp, username: &str) -> String {
    let users = response_json(app.admin(Method::GET, "/api/v1/admin/users", None).await).await;
    users["data"]
        .as_array()
        .and_then(|rows| rows.iter().find(|u| u["username"] == username))
        .and_then(|u| u["id"].as_str())
        .expect("seeded user")
        .to_string()
}

#[tokio::test]
async fn deactivating_an_account_ends_its_sessions_and_blocks_sign_in() {
    let app = TestApp::new().await;
    let token = app.user_with_paths("carla.dias", &[paths::TONERS]).await;
    let id = user_id(&app, "carla.dias").await;
    let uri = format!("/api/v1/admin/users/{}/active", id);

    let by_user = app
        .request(Method::PUT, &uri, Some(json!({ "active": false })), Some(&token))
        .await;
    assert_eq!(by_user.status(), 403);

    let deactivated = response_json(
        app.admin(Method::PUT, &uri, Some(json!({ "active": false })))
            .await,
    )
    .await;
    assert_eq!(deactivated["data"]["active"], false);

    let ended = app
        .request(Method::GET, "/api/v1/toners", None, Some(&token))
        .await;
    assert_eq!(ended.status(), 401);

    let sign_in = app
        .request(
            Method::POST,
            "/api/v1/auth/sign-in",
            Some(json!({ "username": "carla.dias", "password": DEFAULT_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(sign_in.status(), 403);

    app.admin(Method::PUT, &uri, Some(json!({ "active": true })))
        .await;
    app.sign_in("carla.dias", DEFAULT_PASSWORD).await;
}

#[tokio::test]
async fn admin_cannot_lock_out_their_own_account() {
    let app = TestApp::new().await;
    let id = user_id(&app, ADMIN_USERNAME).await;

    let deactivate = app
        .admin(
            Method::PUT,
            &format!("/api/v1/admin/users/{}/active", id),
            Some(json!({ "active": false })),
        )
        .await;
    assert_eq!(deactivate.status(), 400);

    let delete = app
        .admin(Method::DELETE, &format!("/api/v1/admin/users/{}", id), None)
        .await;
    assert_eq!(delete.status(), 400);
}

#[tokio::test]
async fn deleted_account_loses_its_session_and_permissions() {
    let app = TestApp::new().await;
    let token = app.user_with_paths("davi.rocha", &[paths::TCO]).await;
    let id = user_id(&app, "davi.rocha").await;

    let deleted = response_json(
        app.admin(Method::DELETE, &format!("/api/v1/admin/users/{}", id), None)
            .await,
    )
    .await;
    assert_eq!(deleted["data"]["id"], id.as_str());

    let ended = app
        .request(Method::GET, "/api/v1/navigation", None, Some(&token))
        .await;
    assert_eq!(ended.status(), 401);

    let gone = app
        .admin(
            Method::GET,
            &format!("/api/v1/admin/users/{}/permissions", id),
            None,
        )
        .await;
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn dashboard_permission_id_is_accepted() {
    let app = TestApp::new().await;
    app.user_with_paths("elisa.nunes", &[]).await;
    let id = user_id(&app, "elisa.nunes").await;

    let replaced = response_json(
        app.admin(
            Method::PUT,
            &format!("/api/v1/admin/users/{}/permissions", id),
            Some(json!({ "permissions": ["menu_/", permission_id(paths::CHARTS)] })),
        )
        .await,
    )
    .await;
    assert_eq!(
        replaced["data"]["permissions"],
        json!([permission_id(paths::CHARTS)])
    );
}
