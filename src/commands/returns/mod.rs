pub mod record_returned_unit_command;
pub mod update_returned_unit_command;

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    calculations::{return_figures, ReturnFigures, TonerProfile},
    commands::non_negative,
    entities::{returned_unit::Destination, toner, unit},
    errors::ServiceError,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReturnedUnitInput {
    #[validate(range(min = 1, message = "Client code must be positive"))]
    pub client_code: i32,
    pub toner_id: Uuid,
    pub unit_id: Uuid,
    #[validate(custom = "non_negative")]
    pub returned_weight: Decimal,
    pub destination: Destination,
}

/// Loads the referenced toner and unit and derives the stored figures.
pub(crate) async fn resolve_figures<C: ConnectionTrait>(
    db: &C,
    input: &ReturnedUnitInput,
) -> Result<ReturnFigures, ServiceError> {
    let toner = toner::Entity::find_by_id(input.toner_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Toner", input.toner_id))?;

    if unit::Entity::find_by_id(input.unit_id).one(db).await?.is_none() {
        return Err(ServiceError::not_found("Unit", input.unit_id));
    }

    Ok(return_figures(
        &TonerProfile::from(&toner),
        input.returned_weight,
        input.destination,
    ))
}
