pub mod create_tco_command;
pub mod update_tco_command;

use rust_decimal::Decimal;
use sea_orm::Set;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    calculations::{persistable_rows, tco_acquisition_total, AcquisitionCosts, CostRow},
    db::{writer::RowBatch, ChildRows},
    entities::{tco, tco_indirect_cost, tco_operational_cost},
};

pub const OPERATIONAL_COSTS: &str = "operational_costs";
pub const INDIRECT_COSTS: &str = "indirect_costs";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_tco_costs", skip_on_field_errors = true))]
pub struct TcoInput {
    #[validate(length(min = 1, message = "Model cannot be empty"))]
    pub model: String,
    #[validate(length(min = 1, message = "Manufacturer cannot be empty"))]
    pub manufacturer: String,
    #[validate(length(min = 1, message = "Equipment type cannot be empty"))]
    pub kind: String,
    #[serde(flatten)]
    pub costs: AcquisitionCosts,
    pub notes: Option<String>,
    #[serde(default)]
    pub operational_costs: Vec<CostRow>,
    #[serde(default)]
    pub indirect_costs: Vec<CostRow>,
}

fn validate_tco_costs(input: &TcoInput) -> Result<(), ValidationError> {
    let c = &input.costs;
    let operands = [c.device_price, c.pis, c.ipi, c.icms, c.cofins, c.accessories];
    if operands.iter().any(|v| *v < Decimal::ZERO) {
        return Err(ValidationError::new("acquisition costs cannot be negative"));
    }
    let mut rows = input.operational_costs.iter().chain(&input.indirect_costs);
    if rows.any(|r| r.value < Decimal::ZERO) {
        return Err(ValidationError::new("itemized costs cannot be negative"));
    }
    Ok(())
}

impl TcoInput {
    pub fn acquisition_total(&self) -> Decimal {
        tco_acquisition_total(&self.costs)
    }

    pub(crate) fn apply(&self, active: &mut tco::ActiveModel) {
        let c = &self.costs;
        active.model = Set(self.model.trim().to_string());
        active.manufacturer = Set(self.manufacturer.trim().to_string());
        active.kind = Set(self.kind.clone());
        active.device_price = Set(c.device_price);
        active.pis = Set(c.pis);
        active.ipi = Set(c.ipi);
        active.icms = Set(c.icms);
        active.cofins = Set(c.cofins);
        active.accessories = Set(c.accessories);
        active.notes = Set(self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string));
        active.acquisition_total = Set(self.acquisition_total());
    }

    /// Operational cost rows, minus blanks and zeroes.
    pub(crate) fn operational_rows(&self) -> impl ChildRows {
        let rows = persistable_rows(&self.operational_costs);
        RowBatch::<tco_operational_cost::Entity, _>::new(
            OPERATIONAL_COSTS,
            tco_operational_cost::Column::TcoId,
            move |tco_id: Uuid| {
                rows.iter()
                    .map(|row| tco_operational_cost::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tco_id: Set(tco_id),
                        label: Set(row.label.trim().to_string()),
                        value: Set(row.value),
                    })
                    .collect()
            },
        )
    }

    pub(crate) fn indirect_rows(&self) -> impl ChildRows {
        let rows = persistable_rows(&self.indirect_costs);
        RowBatch::<tco_indirect_cost::Entity, _>::new(
            INDIRECT_COSTS,
            tco_indirect_cost::Column::TcoId,
            move |tco_id: Uuid| {
                rows.iter()
                    .map(|row| tco_indirect_cost::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tco_id: Set(tco_id),
                        label: Set(row.label.trim().to_string()),
                        value: Set(row.value),
                    })
                    .collect()
            },
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_input() -> TcoInput {
    use rust_decimal_macros::dec;
    serde_json::from_value(serde_json::json!({
        "model": "M404",
        "manufacturer": "HP",
        "kind": "Laser",
        "device_price": dec!(1000),
        "pis": dec!(10),
        "ipi": dec!(20),
        "icms": dec!(30),
        "cofins": dec!(15),
        "accessories": dec!(5),
        "operational_costs": [
            { "label": "Paper", "value": dec!(40) },
            { "label": "", "value": dec!(12) },
            { "label": "Toner", "value": dec!(0) }
        ],
        "indirect_costs": [
            { "label": "Energy", "value": dec!(8.5) }
        ]
    }))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn acquisition_total_sums_every_operand() {
        assert_eq!(sample_input().acquisition_total(), dec!(1080));
    }

    #[test]
    fn negative_tax_is_rejected() {
        let mut input = sample_input();
        input.costs.icms = dec!(-1);
        assert!(input.validate().is_err());
    }

    #[test]
    fn omitted_taxes_default_to_zero() {
        let input: TcoInput = serde_json::from_value(serde_json::json!({
            "model": "X", "manufacturer": "Y", "kind": "Inkjet", "device_price": dec!(500)
        }))
        .unwrap();
        assert_eq!(input.acquisition_total(), dec!(500));
        assert!(input.operational_costs.is_empty());
        assert!(input.validate().is_ok());
    }
}
