pub mod record_stock_movement_command;
pub mod update_stock_movement_command;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::stock_movement::MovementType;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StockMovementInput {
    #[validate(length(min = 3, message = "Serial number needs at least 3 characters"))]
    pub serial_number: String,
    pub movement_type: MovementType,
    #[validate(length(min = 1, message = "Movement number cannot be empty"))]
    pub movement_number: String,
}
