//! Toner, unit and returned-unit registries through the HTTP API.

mod common;

use axum::http::{header, Method};
use common::{data_id, decimal, response_json, response_text, toner_body, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn toner_registration_derives_price_per_page_and_net_weight() {
    let app = TestApp::new().await;

    let response = app
        .admin(Method::POST, "/api/v1/toners", Some(toner_body("CF258A")))
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(decimal(&body["data"]["price_per_page"]), dec!(0.05));
    assert_eq!(decimal(&body["data"]["net_weight"]), dec!(500));

    let id = data_id(&body);
    let fetched = response_json(
        app.admin(Method::GET, &format!("/api/v1/toners/{}", id), None)
            .await,
    )
    .await;
    assert_eq!(fetched["data"]["model"], "CF258A");
}

#[tokio::test]
async fn toner_with_empty_weight_above_gross_is_rejected() {
    let app = TestApp::new().await;
    let mut body = toner_body("CF258A");
    body["empty_weight"] = json!("900");

    let response = app.admin(Method::POST, "/api/v1/toners", Some(body)).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn toner_preview_saves_nothing() {
    let app = TestApp::new().await;

    let response = app
        .admin(
            Method::POST,
            "/api/v1/toners/preview",
            Some(toner_body("CF258A")),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(decimal(&body["data"]["price_per_page"]), dec!(0.05));

    let list = response_json(app.admin(Method::GET, "/api/v1/toners", None).await).await;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn toner_list_search_matches_any_displayed_column() {
    let app = TestApp::new().await;
    app.admin(Method::POST, "/api/v1/toners", Some(toner_body("CF258A")))
        .await;
    let mut other = toner_body("TN-1060");
    other["compatible_printers"] = json!("HL-1212");
    other["color"] = json!("Cyan");
    app.admin(Method::POST, "/api/v1/toners", Some(other)).await;

    let by_printer = response_json(
        app.admin(Method::GET, "/api/v1/toners?search=hl-12", None)
            .await,
    )
    .await;
    let rows = by_printer["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["model"], "TN-1060");

    let everything = response_json(app.admin(Method::GET, "/api/v1/toners", None).await).await;
    assert_eq!(everything["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn toner_export_is_a_csv_attachment() {
    let app = TestApp::new().await;
    app.admin(Method::POST, "/api/v1/toners", Some(toner_body("CF258A")))
        .await;

    let response = app.admin(Method::GET, "/api/v1/toners/export", None).await;
    assert_eq!(response.status(), 200);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("toners.csv"));

    let csv = response_text(response).await;
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("model,color,kind"));
    assert!(lines.next().unwrap().starts_with("CF258A,Black,Compatible"));
}

#[tokio::test]
async fn returned_unit_figures_are_computed_from_the_toner() {
    let app = TestApp::new().await;
    let (unit_id, toner_id) = app.seed_unit_and_toner().await;

    let response = app
        .admin(
            Method::POST,
            "/api/v1/returned-units",
            Some(json!({
                "client_code": 4521,
                "toner_id": toner_id,
                "unit_id": unit_id,
                "returned_weight": "600",
                "destination": "Stock"
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    let data = &body["data"];
    assert_eq!(decimal(&data["remaining_weight"]), dec!(250));
    assert_eq!(data["remaining_pages"], 1500);
    assert_eq!(decimal(&data["usable_percentage"]), dec!(50));
    assert_eq!(decimal(&data["recovered_value"]), dec!(500));

    let list = response_json(
        app.admin(Method::GET, "/api/v1/returned-units?search=matriz", None)
            .await,
    )
    .await;
    let rows = list["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["toner_model"], "CF258A");
    assert_eq!(rows[0]["unit_name"], "Matriz");
}

#[tokio::test]
async fn returned_unit_preview_suggests_a_destination() {
    let app = TestApp::new().await;
    let (_, toner_id) = app.seed_unit_and_toner().await;

    let body = response_json(
        app.admin(
            Method::POST,
            "/api/v1/returned-units/preview",
            Some(json!({
                "toner_id": toner_id,
                "returned_weight": "800",
                "destination": "Discard"
            })),
        )
        .await,
    )
    .await;
    assert_eq!(decimal(&body["data"]["usable_percentage"]), dec!(90));
    assert_eq!(body["data"]["suggestion"], "StockAsNew");
    assert!(body["data"]["advice"]
        .as_str()
        .is_some_and(|text| text.contains("stock as new")));
    assert_eq!(decimal(&body["data"]["recovered_value"]), dec!(0));
}

#[tokio::test]
async fn returned_unit_for_unknown_toner_is_not_found() {
    let app = TestApp::new().await;
    let (unit_id, _) = app.seed_unit_and_toner().await;

    let response = app
        .admin(
            Method::POST,
            "/api/v1/returned-units",
            Some(json!({
                "client_code": 1,
                "toner_id": uuid::Uuid::new_v4(),
                "unit_id": unit_id,
                "returned_weight": "600",
                "destination": "Stock"
            })),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn deleting_a_toner_removes_its_returned_units() {
    let app = TestApp::new().await;
    let (unit_id, toner_id) = app.seed_unit_and_toner().await;
    let returned = response_json(
        app.admin(
            Method::POST,
            "/api/v1/returned-units",
            Some(json!({
                "client_code": 77,
                "toner_id": toner_id,
                "unit_id": unit_id,
                "returned_weight": "400",
                "destination": "Discard"
            })),
        )
        .await,
    )
    .await;
    let returned_id = data_id(&returned);

    let response = app
        .admin_confirmed(Method::DELETE, &format!("/api/v1/toners/{}", toner_id), None)
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["data"]["cascaded"], 1);

    let gone = app
        .admin(
            Method::GET,
            &format!("/api/v1/returned-units/{}", returned_id),
            None,
        )
        .await;
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn unit_rename_requires_step_up() {
    let app = TestApp::new().await;
    let (unit_id, _) = app.seed_unit_and_toner().await;

    let unconfirmed = app
        .admin(
            Method::PUT,
            &format!("/api/v1/units/{}", unit_id),
            Some(json!({ "name": "Sede" })),
        )
        .await;
    assert_eq!(unconfirmed.status(), 401);

    let renamed = app
        .admin_confirmed(
            Method::PUT,
            &format!("/api/v1/units/{}", unit_id),
            Some(json!({ "name": "Sede" })),
        )
        .await;
    assert_eq!(renamed.status(), 200);

    let list = response_json(app.admin(Method::GET, "/api/v1/units", None).await).await;
    assert_eq!(list["data"][0]["name"], "Sede");
}
