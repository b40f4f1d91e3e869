use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::stock_movement,
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::StockMovementInput;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordStockMovementCommand {
    #[serde(flatten)]
    pub input: StockMovementInput,
}

#[async_trait]
impl Command for RecordStockMovementCommand {
    type Result = stock_movement::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(serial = %self.input.serial_number))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;

        let input = &self.input;
        let movement = stock_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            serial_number: Set(input.serial_number.trim().to_string()),
            movement_type: Set(input.movement_type),
            movement_number: Set(input.movement_number.trim().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(db_pool.as_ref())
        .await?;

        event_sender
            .send_or_log(Event::StockMovementRecorded(movement.id))
            .await;
        info!(
            movement_id = %movement.id,
            movement_type = movement.movement_type.label(),
            "Stock movement recorded"
        );
        Ok(movement)
    }
}
