//! CSV renderings of the registry list views.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    entities::{non_conformity, stock_movement, toner, warranty_claim},
    errors::ServiceError,
};

use super::returns::ReturnedUnitRow;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Writes `rows` with a header line taken from the record's field names.
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<String, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::SerializationError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::SerializationError(e.to_string()))
}

#[derive(Debug, Serialize)]
pub struct TonerRecord<'a> {
    pub model: &'a str,
    pub color: String,
    pub kind: String,
    pub compatible_printers: &'a str,
    pub gross_weight: Decimal,
    pub empty_weight: Decimal,
    pub net_weight: Decimal,
    pub page_yield: i32,
    pub print_coverage: Decimal,
    pub unit_price: Decimal,
    pub price_per_page: Decimal,
    pub registered_on: String,
}

impl<'a> From<&'a toner::Model> for TonerRecord<'a> {
    fn from(t: &'a toner::Model) -> Self {
        Self {
            model: &t.model,
            color: t.color.to_string(),
            kind: t.kind.to_string(),
            compatible_printers: &t.compatible_printers,
            gross_weight: t.gross_weight,
            empty_weight: t.empty_weight,
            net_weight: t.net_weight,
            page_yield: t.page_yield,
            print_coverage: t.print_coverage,
            unit_price: t.unit_price,
            price_per_page: t.price_per_page,
            registered_on: super::display_date(&t.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReturnedUnitRecord<'a> {
    pub client_code: i32,
    pub toner_model: &'a str,
    pub unit: &'a str,
    pub returned_weight: Decimal,
    pub destination: String,
    pub remaining_weight: Decimal,
    pub remaining_pages: i64,
    pub usable_percentage: Decimal,
    pub recovered_value: Decimal,
    pub registered_on: String,
}

impl<'a> From<&'a ReturnedUnitRow> for ReturnedUnitRecord<'a> {
    fn from(row: &'a ReturnedUnitRow) -> Self {
        let r = &row.record;
        Self {
            client_code: r.client_code,
            toner_model: &row.toner_model,
            unit: &row.unit_name,
            returned_weight: r.returned_weight,
            destination: r.destination.to_string(),
            remaining_weight: r.remaining_weight,
            remaining_pages: r.remaining_pages,
            usable_percentage: r.usable_percentage,
            recovered_value: r.recovered_value,
            registered_on: super::display_date(&r.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WarrantyRecord<'a> {
    pub requester: &'a str,
    pub requested_on: String,
    pub product_code: &'a str,
    pub serial_number: &'a str,
    pub item_type: String,
    pub supplier: &'a str,
    pub quantity: i32,
    pub status: String,
    pub ticket_number: &'a str,
    pub purchase_invoice: &'a str,
    pub shipment_invoice: &'a str,
    pub return_invoice: &'a str,
    pub warranty_date: Option<String>,
    pub defect_notes: &'a str,
    pub total_value: Decimal,
}

impl<'a> From<&'a warranty_claim::Model> for WarrantyRecord<'a> {
    fn from(c: &'a warranty_claim::Model) -> Self {
        Self {
            requester: &c.requester,
            requested_on: c.requested_on.format("%d/%m/%Y").to_string(),
            product_code: &c.product_code,
            serial_number: &c.serial_number,
            item_type: c.item_type.to_string(),
            supplier: &c.supplier,
            quantity: c.quantity,
            status: c.status.to_string(),
            ticket_number: &c.ticket_number,
            purchase_invoice: &c.purchase_invoice,
            shipment_invoice: &c.shipment_invoice,
            return_invoice: &c.return_invoice,
            warranty_date: c.warranty_date.map(|d| d.format("%d/%m/%Y").to_string()),
            defect_notes: &c.defect_notes,
            total_value: c.total_value,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NonConformityRecord<'a> {
    pub number: &'a str,
    pub opened_by: &'a str,
    pub description: &'a str,
    pub kind: String,
    pub severity: String,
    pub department: &'a str,
    pub root_cause: &'a str,
    pub immediate_action: &'a str,
    pub action_owner: &'a str,
    pub due_date: String,
    pub status: String,
    pub solution_evidence: &'a str,
    pub opened_on: String,
    pub closed_on: Option<String>,
}

impl<'a> From<&'a non_conformity::Model> for NonConformityRecord<'a> {
    fn from(nc: &'a non_conformity::Model) -> Self {
        Self {
            number: &nc.number,
            opened_by: &nc.opened_by,
            description: &nc.description,
            kind: nc.kind.to_string(),
            severity: nc.severity.to_string(),
            department: &nc.department,
            root_cause: &nc.root_cause,
            immediate_action: &nc.immediate_action,
            action_owner: &nc.action_owner,
            due_date: nc.due_date.format("%d/%m/%Y").to_string(),
            status: nc.status.to_string(),
            solution_evidence: nc.solution_evidence.as_deref().unwrap_or_default(),
            opened_on: super::display_date(&nc.created_at),
            closed_on: nc.closed_at.as_ref().map(super::display_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovementRecord<'a> {
    pub serial_number: &'a str,
    pub movement_type: &'static str,
    pub movement_number: &'a str,
    pub recorded_on: String,
}

impl<'a> From<&'a stock_movement::Model> for MovementRecord<'a> {
    fn from(m: &'a stock_movement::Model) -> Self {
        Self {
            serial_number: &m.serial_number,
            movement_type: m.movement_type.label(),
            movement_number: &m.movement_number,
            recorded_on: super::display_date(&m.created_at),
        }
    }
}

pub fn toners_csv(toners: &[toner::Model]) -> Result<String, ServiceError> {
    let records: Vec<TonerRecord<'_>> = toners.iter().map(TonerRecord::from).collect();
    to_csv(&records)
}

pub fn returned_units_csv(rows: &[ReturnedUnitRow]) -> Result<String, ServiceError> {
    let records: Vec<ReturnedUnitRecord<'_>> = rows.iter().map(ReturnedUnitRecord::from).collect();
    to_csv(&records)
}

pub fn warranties_csv(claims: &[warranty_claim::Model]) -> Result<String, ServiceError> {
    let records: Vec<WarrantyRecord<'_>> = claims.iter().map(WarrantyRecord::from).collect();
    to_csv(&records)
}

pub fn non_conformities_csv(rows: &[non_conformity::Model]) -> Result<String, ServiceError> {
    let records: Vec<NonConformityRecord<'_>> = rows.iter().map(NonConformityRecord::from).collect();
    to_csv(&records)
}

pub fn movements_csv(rows: &[stock_movement::Model]) -> Result<String, ServiceError> {
    let records: Vec<MovementRecord<'_>> = rows.iter().map(MovementRecord::from).collect();
    to_csv(&records)
}
