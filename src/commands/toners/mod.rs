pub mod create_toner_command;
pub mod delete_toner_command;
pub mod update_toner_command;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    calculations::{toner_figures, TonerFigures},
    commands::non_negative,
    entities::toner::{TonerColor, TonerKind},
};

/// Editable toner fields. Price per page and net weight are always derived.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "empty_not_above_gross", skip_on_field_errors = true))]
pub struct TonerInput {
    #[validate(length(min = 1, max = 120, message = "Model cannot be empty"))]
    pub model: String,
    #[validate(custom = "non_negative")]
    pub gross_weight: Decimal,
    #[validate(custom = "non_negative")]
    pub empty_weight: Decimal,
    #[validate(length(min = 1, message = "Compatible printers cannot be empty"))]
    pub compatible_printers: String,
    pub color: TonerColor,
    #[validate(custom = "non_negative")]
    pub print_coverage: Decimal,
    #[validate(range(min = 1, message = "Page yield must be greater than 0"))]
    pub page_yield: i32,
    pub kind: TonerKind,
    #[validate(custom = "non_negative")]
    pub unit_price: Decimal,
}

fn empty_not_above_gross(input: &TonerInput) -> Result<(), ValidationError> {
    if input.empty_weight > input.gross_weight {
        let mut err = ValidationError::new("weights");
        err.message = Some("Empty weight cannot exceed gross weight".into());
        return Err(err);
    }
    Ok(())
}

impl TonerInput {
    pub fn figures(&self) -> TonerFigures {
        toner_figures(
            self.unit_price,
            self.page_yield,
            self.gross_weight,
            self.empty_weight,
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_input() -> TonerInput {
    use rust_decimal_macros::dec;
    TonerInput {
        model: "CF258A".into(),
        gross_weight: dec!(850.5),
        empty_weight: dec!(350.2),
        compatible_printers: "M404, M428".into(),
        color: TonerColor::Black,
        print_coverage: dec!(5),
        page_yield: 3000,
        kind: TonerKind::Compatible,
        unit_price: dec!(150),
    }
}
