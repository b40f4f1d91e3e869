//! Multi-collection writes: TCO cost rows and audit forms/records.

mod common;

use axum::http::Method;
use common::{data_id, decimal, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn tco_body() -> Value {
    json!({
        "model": "Laser 9000",
        "manufacturer": "HP",
        "kind": "Multifuncional",
        "device_price": "5000",
        "pis": "82.50",
        "ipi": 250,
        "icms": "900",
        "cofins": "380",
        "accessories": "0",
        "operational_costs": [
            { "label": "Energia", "value": "45.90" },
            { "label": "Papel", "value": "120" },
            { "label": "", "value": "30" },
            { "label": "Manutenção", "value": "0" }
        ],
        "indirect_costs": [
            { "label": "Suporte", "value": "200" }
        ]
    })
}

#[tokio::test]
async fn tco_saves_only_filled_cost_rows() {
    let app = TestApp::new().await;

    let response = app.admin(Method::POST, "/api/v1/tco", Some(tco_body())).await;
    assert_eq!(response.status(), 200);
    let saved = response_json(response).await;
    let rows = &saved["data"]["rows_written"];
    assert_eq!(rows["operational_costs"], 2);
    assert_eq!(rows["indirect_costs"], 1);
    assert_eq!(
        decimal(&saved["data"]["record"]["acquisition_total"]),
        dec!(6612.50)
    );

    let id = saved["data"]["record"]["id"].as_str().expect("tco id");
    let detail = response_json(
        app.admin(Method::GET, &format!("/api/v1/tco/{}", id), None)
            .await,
    )
    .await;
    let data = &detail["data"];
    assert_eq!(data["model"], "Laser 9000");
    assert_eq!(data["operational_costs"].as_array().map(Vec::len), Some(2));
    assert_eq!(decimal(&data["operational_monthly_total"]), dec!(165.90));
    assert_eq!(decimal(&data["indirect_monthly_total"]), dec!(200));
}

#[tokio::test]
async fn tco_preview_counts_every_row() {
    let app = TestApp::new().await;

    let body = response_json(
        app.admin(Method::POST, "/api/v1/tco/preview", Some(tco_body()))
            .await,
    )
    .await;
    assert_eq!(decimal(&body["data"]["acquisition_total"]), dec!(6612.50));
    assert_eq!(
        decimal(&body["data"]["operational_monthly_total"]),
        dec!(195.90)
    );

    let list = response_json(app.admin(Method::GET, "/api/v1/tco", None).await).await;
    assert_eq!(list["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn tco_with_negative_cost_is_rejected() {
    let app = TestApp::new().await;
    let mut body = tco_body();
    body["icms"] = json!("-1");

    let response = app.admin(Method::POST, "/api/v1/tco", Some(body)).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn tco_update_replaces_cost_rows_after_step_up() {
    let app = TestApp::new().await;
    let saved = response_json(app.admin(Method::POST, "/api/v1/tco", Some(tco_body())).await).await;
    let uri = format!("/api/v1/tco/{}", saved["data"]["record"]["id"].as_str().unwrap());

    let mut changed = tco_body();
    changed["operational_costs"] = json!([{ "label": "Energia", "value": "50" }]);
    changed["indirect_costs"] = json!([]);

    let unconfirmed = app.admin(Method::PUT, &uri, Some(changed.clone())).await;
    assert_eq!(unconfirmed.status(), 401);

    let updated = response_json(app.admin_confirmed(Method::PUT, &uri, Some(changed)).await).await;
    assert_eq!(updated["data"]["rows_written"]["operational_costs"], 1);
    assert_eq!(updated["data"]["rows_written"]["indirect_costs"], 0);

    let detail = response_json(app.admin(Method::GET, &uri, None).await).await;
    assert_eq!(decimal(&detail["data"]["operational_monthly_total"]), dec!(50));
    assert_eq!(detail["data"]["indirect_costs"], json!([]));
}

fn audit_form_body(unit_id: uuid::Uuid) -> Value {
    json!({
        "title": "Auditoria de Expedição",
        "auditor": "Ana",
        "unit_id": unit_id,
        "sections": [
            {
                "title": "Organização",
                "items": [
                    { "description": "Área limpa", "mode": "Conformity" },
                    { "description": "Etiquetas legíveis", "mode": "Percentage", "percentage": "80" }
                ]
            },
            {
                "title": "Documentação",
                "items": [
                    { "description": "Notas arquivadas", "mode": "Conformity" }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn audit_form_keeps_section_and_item_order() {
    let app = TestApp::new().await;
    let (unit_id, _) = app.seed_unit_and_toner().await;

    let saved = response_json(
        app.admin(Method::POST, "/api/v1/audit-forms", Some(audit_form_body(unit_id)))
            .await,
    )
    .await;
    assert_eq!(saved["data"]["rows_written"]["sections"], 2);
    assert_eq!(saved["data"]["rows_written"]["items"], 3);
    let form_id = saved["data"]["record"]["id"].as_str().unwrap().to_string();

    let form = response_json(
        app.admin(Method::GET, &format!("/api/v1/audit-forms/{}", form_id), None)
            .await,
    )
    .await;
    let sections = form["data"]["sections"].as_array().expect("sections");
    assert_eq!(sections[0]["title"], "Organização");
    assert_eq!(sections[0]["position"], 1);
    assert_eq!(sections[0]["items"][1]["mode"], "Percentage");
    assert_eq!(decimal(&sections[0]["items"][1]["percentage"]), dec!(80));
    assert_eq!(sections[1]["items"][0]["description"], "Notas arquivadas");
}

#[tokio::test]
async fn audit_item_percentage_must_stay_within_one_hundred() {
    let app = TestApp::new().await;
    let (unit_id, _) = app.seed_unit_and_toner().await;
    let mut body = audit_form_body(unit_id);
    body["sections"][0]["items"][1]["percentage"] = json!("120");

    let response = app
        .admin(Method::POST, "/api/v1/audit-forms", Some(body))
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn audit_form_without_sections_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .admin(
            Method::POST,
            "/api/v1/audit-forms",
            Some(json!({ "title": "Vazio", "sections": [] })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn recorded_audit_answers_every_item() {
    let app = TestApp::new().await;
    let (unit_id, _) = app.seed_unit_and_toner().await;
    let saved = response_json(
        app.admin(Method::POST, "/api/v1/audit-forms", Some(audit_form_body(unit_id)))
            .await,
    )
    .await;
    let form_id = saved["data"]["record"]["id"].as_str().unwrap().to_string();
    let form = response_json(
        app.admin(Method::GET, &format!("/api/v1/audit-forms/{}", form_id), None)
            .await,
    )
    .await;
    let first_item = form["data"]["sections"][0]["items"][0]["id"].clone();

    let response = app
        .admin(
            Method::POST,
            "/api/v1/audit-records",
            Some(json!({
                "form_id": form_id,
                "auditor": "Ana",
                "unit_id": unit_id,
                "audited_on": "2024-03-12",
                "answers": [
                    { "item_id": first_item, "conforming": false, "notes": "Caixas no corredor" }
                ]
            })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let recorded = response_json(response).await;
    assert_eq!(recorded["data"]["rows_written"]["responses"], 3);
    let record_id = recorded["data"]["record"]["id"].as_str().unwrap().to_string();

    let list = response_json(
        app.admin(Method::GET, "/api/v1/audit-records?search=auditoria", None)
            .await,
    )
    .await;
    let rows = list["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["form_title"], "Auditoria de Expedição");
    assert_eq!(rows[0]["unit_name"], "Matriz");
    assert_eq!(rows[0]["non_conforming"], 1);

    let detail = response_json(
        app.admin(Method::GET, &format!("/api/v1/audit-records/{}", record_id), None)
            .await,
    )
    .await;
    let responses = detail["data"]["responses"].as_array().expect("responses");
    assert_eq!(responses.len(), 3);
    let flagged: Vec<&Value> = responses
        .iter()
        .filter(|r| r["conforming"] == false)
        .collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["item_id"], first_item);
    assert_eq!(flagged[0]["notes"], "Caixas no corredor");
}

#[tokio::test]
async fn audit_answer_for_a_foreign_item_is_rejected() {
    let app = TestApp::new().await;
    let (unit_id, _) = app.seed_unit_and_toner().await;
    let saved = response_json(
        app.admin(Method::POST, "/api/v1/audit-forms", Some(audit_form_body(unit_id)))
            .await,
    )
    .await;

    let response = app
        .admin(
            Method::POST,
            "/api/v1/audit-records",
            Some(json!({
                "form_id": data_id(&json!({ "data": saved["data"]["record"] })),
                "auditor": "Ana",
                "unit_id": unit_id,
                "audited_on": "2024-03-12",
                "answers": [{ "item_id": uuid::Uuid::new_v4(), "conforming": true }]
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}
