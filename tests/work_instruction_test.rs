//! Versioned work-instruction uploads.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request},
};
use common::{data_id, decimal, response_json, response_text, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

const BOUNDARY: &str = "sgq-test-boundary";

fn multipart_body(name: Option<&str>, file_name: &str, contents: &str) -> String {
    let mut body = String::new();
    if let Some(name) = name {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/pdf\r\n\r\n{contents}\r\n--{BOUNDARY}--\r\n"
    ));
    body
}

async fn upload(app: &TestApp, uri: &str, body: String) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", app.admin_token()))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("multipart request");
    app.send(request).await
}

#[tokio::test]
async fn first_upload_is_version_one_and_is_served() {
    let app = TestApp::new().await;

    let response = upload(
        &app,
        "/api/v1/work-instructions",
        multipart_body(Some("Troca de cilindro"), "Cilindro.PDF", "%PDF-1.4 passo 1"),
    )
    .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["name"], "Troca de cilindro");
    let version = &body["data"]["versions"][0];
    assert_eq!(decimal(&version["version"]), dec!(1.0));

    let path = version["storage_path"].as_str().expect("storage path");
    assert!(path.starts_with("work-instructions/"));
    assert!(path.ends_with(".pdf"));
    let url = version["file_url"].as_str().expect("file url");
    assert_eq!(url, format!("/files/{}", path));

    let served = app
        .send(Request::builder().uri(url).body(Body::empty()).unwrap())
        .await;
    assert_eq!(served.status(), 200);
    assert_eq!(response_text(served).await, "%PDF-1.4 passo 1");
}

#[tokio::test]
async fn new_versions_step_by_a_tenth() {
    let app = TestApp::new().await;
    let created = response_json(
        upload(
            &app,
            "/api/v1/work-instructions",
            multipart_body(Some("Calibração"), "v1.pdf", "um"),
        )
        .await,
    )
    .await;
    let id = data_id(&created);

    let second = response_json(
        upload(
            &app,
            &format!("/api/v1/work-instructions/{}/versions", id),
            multipart_body(None, "v2.pdf", "dois"),
        )
        .await,
    )
    .await;
    assert_eq!(decimal(&second["data"]["version"]), dec!(1.1));

    let list = response_json(
        app.admin(Method::GET, "/api/v1/work-instructions?search=calibra", None)
            .await,
    )
    .await;
    let versions = list["data"][0]["versions"].as_array().expect("versions");
    assert_eq!(versions.len(), 2);
    assert_eq!(decimal(&versions[0]["version"]), dec!(1.1));
}

#[tokio::test]
async fn upload_without_a_file_or_name_is_rejected() {
    let app = TestApp::new().await;

    let empty_file = upload(
        &app,
        "/api/v1/work-instructions",
        multipart_body(Some("Vazia"), "vazio.pdf", ""),
    )
    .await;
    assert_eq!(empty_file.status(), 400);

    let unnamed = upload(
        &app,
        "/api/v1/work-instructions",
        multipart_body(None, "sem-nome.pdf", "conteúdo"),
    )
    .await;
    assert_eq!(unnamed.status(), 400);
}

#[tokio::test]
async fn views_are_appended_to_the_version_log() {
    let app = TestApp::new().await;
    let created = response_json(
        upload(
            &app,
            "/api/v1/work-instructions",
            multipart_body(Some("Limpeza"), "limpeza.pdf", "passos"),
        )
        .await,
    )
    .await;
    let version_id = created["data"]["versions"][0]["id"]
        .as_str()
        .expect("version id")
        .to_string();
    let uri = format!("/api/v1/work-instructions/versions/{}/views", version_id);

    app.admin(Method::POST, &uri, Some(json!({ "viewer": "Ana" })))
        .await;
    let viewed = response_json(
        app.admin(Method::POST, &uri, Some(json!({ "viewer": "Bruno" })))
            .await,
    )
    .await;
    let log = viewed["data"]["view_log"].as_array().expect("view log");
    assert_eq!(log.len(), 2);
    assert_eq!(log[0]["viewer"], "Ana");
    assert_eq!(log[1]["viewer"], "Bruno");

    let blank = app
        .admin(Method::POST, &uri, Some(json!({ "viewer": "" })))
        .await;
    assert_eq!(blank.status(), 400);
}

#[tokio::test]
async fn only_admins_delete_instructions() {
    let app = TestApp::new().await;
    let created = response_json(
        upload(
            &app,
            "/api/v1/work-instructions",
            multipart_body(Some("Descarte"), "descarte.pdf", "passos"),
        )
        .await,
    )
    .await;
    let uri = format!("/api/v1/work-instructions/{}", data_id(&created));

    let token = app.user_with_paths("vera.costa", &[]).await;
    let forbidden = app
        .request_with_headers(
            Method::DELETE,
            &uri,
            None,
            Some(&token),
            &[(sgq_api::auth::CONFIRM_PASSWORD_HEADER, common::DEFAULT_PASSWORD)],
        )
        .await;
    assert_eq!(forbidden.status(), 403);

    let deleted = app.admin_confirmed(Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status(), 200);

    let list = response_json(app.admin(Method::GET, "/api/v1/work-instructions", None).await).await;
    assert_eq!(list["data"], json!([]));
}
