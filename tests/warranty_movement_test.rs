//! Warranty claims, their chart aggregates and stock movements.

mod common;

use axum::http::Method;
use common::{data_id, decimal, response_json, response_text, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn claim(supplier: &str, requested_on: &str, value: &str) -> Value {
    json!({
        "requester": "Ana Silva",
        "requested_on": requested_on,
        "product_code": "CF258A",
        "serial_number": "SN-0001",
        "item_type": "Toner",
        "supplier": supplier,
        "total_value": value
    })
}

async fn seed_claims(app: &TestApp) {
    for body in [
        claim("Acme", "2024-01-15", "100"),
        claim("Acme", "2024-02-03", "50.50"),
        claim("Brasil Print", "2024-02-20", "300"),
    ] {
        let response = app.admin(Method::POST, "/api/v1/warranties", Some(body)).await;
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
async fn warranty_claim_defaults_to_open_with_quantity_one() {
    let app = TestApp::new().await;

    let body = response_json(
        app.admin(
            Method::POST,
            "/api/v1/warranties",
            Some(claim("Acme", "2024-01-15", "100")),
        )
        .await,
    )
    .await;
    assert_eq!(body["data"]["status"], "Open");
    assert_eq!(body["data"]["quantity"], 1);
    assert_eq!(body["data"]["purchase_invoice"], "");

    let mut bad = claim("Acme", "2024-01-15", "100");
    bad["quantity"] = json!(0);
    let rejected = app.admin(Method::POST, "/api/v1/warranties", Some(bad)).await;
    assert_eq!(rejected.status(), 400);
}

#[tokio::test]
async fn warranty_status_update_goes_through_step_up() {
    let app = TestApp::new().await;
    let created = response_json(
        app.admin(
            Method::POST,
            "/api/v1/warranties",
            Some(claim("Acme", "2024-01-15", "100")),
        )
        .await,
    )
    .await;
    let uri = format!("/api/v1/warranties/{}", data_id(&created));

    let mut changed = claim("Acme", "2024-01-15", "100");
    changed["status"] = json!("Done");
    changed["ticket_number"] = json!("CH-99");
    let updated = response_json(app.admin_confirmed(Method::PUT, &uri, Some(changed)).await).await;
    assert_eq!(updated["data"]["status"], "Done");
    assert_eq!(updated["data"]["ticket_number"], "CH-99");

    let deleted = app.admin_confirmed(Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status(), 200);
    let gone = app.admin(Method::GET, &uri, None).await;
    assert_eq!(gone.status(), 404);
}

#[tokio::test]
async fn warranty_export_lists_every_claim() {
    let app = TestApp::new().await;
    seed_claims(&app).await;

    let csv = response_text(
        app.admin(Method::GET, "/api/v1/warranties/export", None)
            .await,
    )
    .await;
    let lines: Vec<&str> = csv.lines().collect();
    assert!(lines[0].starts_with("requester,requested_on,product_code"));
    assert_eq!(lines.len(), 4);
    assert!(csv.contains("20/02/2024"));
}

#[tokio::test]
async fn charts_group_claims_by_month_supplier_and_status() {
    let app = TestApp::new().await;
    seed_claims(&app).await;

    let by_month = response_json(
        app.admin(Method::GET, "/api/v1/charts/warranties/by-month", None)
            .await,
    )
    .await;
    let months = by_month["data"].as_array().expect("points");
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["label"], "2024-01");
    assert_eq!(months[1]["label"], "2024-02");
    assert_eq!(months[1]["count"], 2);
    assert_eq!(decimal(&months[1]["total_value"]), dec!(350.50));

    let by_supplier = response_json(
        app.admin(Method::GET, "/api/v1/charts/warranties/by-supplier", None)
            .await,
    )
    .await;
    assert_eq!(by_supplier["data"][0]["label"], "Acme");
    assert_eq!(by_supplier["data"][0]["count"], 2);
    assert_eq!(decimal(&by_supplier["data"][0]["total_value"]), dec!(150.50));

    let by_status = response_json(
        app.admin(Method::GET, "/api/v1/charts/warranties/by-status", None)
            .await,
    )
    .await;
    assert_eq!(
        by_status["data"],
        json!([{ "label": "Open", "count": 3, "total_value": by_status["data"][0]["total_value"] }])
    );
    assert_eq!(decimal(&by_status["data"][0]["total_value"]), dec!(450.50));
}

#[tokio::test]
async fn stock_movements_are_recorded_and_searchable() {
    let app = TestApp::new().await;

    let short = app
        .admin(
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "serial_number": "AB",
                "movement_type": "StockToQuarantine",
                "movement_number": "M-1"
            })),
        )
        .await;
    assert_eq!(short.status(), 400);

    let recorded = response_json(
        app.admin(
            Method::POST,
            "/api/v1/movements",
            Some(json!({
                "serial_number": "BRX1234",
                "movement_type": "QuarantineToPrintTechnicalArea",
                "movement_number": "M-2"
            })),
        )
        .await,
    )
    .await;
    let uri = format!("/api/v1/movements/{}", data_id(&recorded));

    let list = response_json(
        app.admin(Method::GET, "/api/v1/movements?search=brx", None)
            .await,
    )
    .await;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(1));

    let unconfirmed = app.admin(Method::DELETE, &uri, None).await;
    assert_eq!(unconfirmed.status(), 401);
    let deleted = app.admin_confirmed(Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status(), 200);
}

#[tokio::test]
async fn stock_movement_export_uses_display_labels() {
    let app = TestApp::new().await;
    for (serial, kind) in [
        ("BRX1234", "StockToQuarantine"),
        ("ZQW9876", "PackagingToLogistics"),
    ] {
        let response = app
            .admin(
                Method::POST,
                "/api/v1/movements",
                Some(json!({
                    "serial_number": serial,
                    "movement_type": kind,
                    "movement_number": "M-10"
                })),
            )
            .await;
        assert_eq!(response.status(), 200);
    }

    let csv = response_text(
        app.admin(Method::GET, "/api/v1/movements/export?search=zqw", None)
            .await,
    )
    .await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "serial_number,movement_type,movement_number,recorded_on"
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("ZQW9876,Packaging to Logistics,M-10,"));
}
