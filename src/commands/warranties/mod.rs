pub mod create_warranty_claim_command;
pub mod update_warranty_claim_command;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    commands::non_negative,
    entities::warranty_claim::{self, CaseStatus, ItemType},
};

fn default_status() -> CaseStatus {
    CaseStatus::Open
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct WarrantyClaimInput {
    #[validate(length(min = 1, message = "Requester cannot be empty"))]
    pub requester: String,
    pub requested_on: NaiveDate,
    #[validate(length(min = 1, message = "Product code cannot be empty"))]
    pub product_code: String,
    #[validate(length(min = 1, message = "Serial number cannot be empty"))]
    pub serial_number: String,
    pub item_type: ItemType,
    #[serde(default)]
    pub purchase_invoice: String,
    #[serde(default)]
    pub shipment_invoice: String,
    #[serde(default)]
    pub return_invoice: String,
    #[serde(default)]
    pub purchase_invoice_key: String,
    #[serde(default)]
    pub shipment_invoice_key: String,
    #[serde(default)]
    pub return_invoice_key: String,
    pub warranty_date: Option<NaiveDate>,
    #[serde(default)]
    pub ticket_number: String,
    #[serde(default = "default_status")]
    pub status: CaseStatus,
    #[validate(length(min = 1, message = "Supplier cannot be empty"))]
    pub supplier: String,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub defect_notes: String,
    #[validate(custom = "non_negative")]
    pub total_value: Decimal,
}

impl WarrantyClaimInput {
    /// Copies every editable field onto `active`.
    pub(crate) fn apply(&self, active: &mut warranty_claim::ActiveModel) {
        active.requester = Set(self.requester.trim().to_string());
        active.requested_on = Set(self.requested_on);
        active.product_code = Set(self.product_code.clone());
        active.serial_number = Set(self.serial_number.clone());
        active.item_type = Set(self.item_type);
        active.purchase_invoice = Set(self.purchase_invoice.clone());
        active.shipment_invoice = Set(self.shipment_invoice.clone());
        active.return_invoice = Set(self.return_invoice.clone());
        active.purchase_invoice_key = Set(self.purchase_invoice_key.clone());
        active.shipment_invoice_key = Set(self.shipment_invoice_key.clone());
        active.return_invoice_key = Set(self.return_invoice_key.clone());
        active.warranty_date = Set(self.warranty_date);
        active.ticket_number = Set(self.ticket_number.clone());
        active.status = Set(self.status);
        active.supplier = Set(self.supplier.trim().to_string());
        active.quantity = Set(self.quantity);
        active.defect_notes = Set(self.defect_notes.clone());
        active.total_value = Set(self.total_value);
    }
}

#[cfg(test)]
pub(crate) fn sample_input() -> WarrantyClaimInput {
    use rust_decimal_macros::dec;
    serde_json::from_value(serde_json::json!({
        "requester": "Ana",
        "requested_on": "2024-03-10",
        "product_code": "CF258A",
        "serial_number": "SN-001",
        "item_type": "Toner",
        "supplier": "Acme",
        "total_value": dec!(320.5),
    }))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_take_defaults() {
        let input = sample_input();
        assert_eq!(input.status, CaseStatus::Open);
        assert_eq!(input.quantity, 1);
        assert!(input.purchase_invoice.is_empty());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let input = WarrantyClaimInput {
            quantity: 0,
            ..sample_input()
        };
        assert!(input.validate().is_err());
    }
}
