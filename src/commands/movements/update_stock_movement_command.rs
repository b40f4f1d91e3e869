use crate::commands::Command;
use crate::{db::DbPool, entities::stock_movement, errors::ServiceError, events::EventSender};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::StockMovementInput;

#[derive(Debug, Clone)]
pub struct UpdateStockMovementCommand {
    pub id: Uuid,
    pub input: StockMovementInput,
}

#[async_trait]
impl Command for UpdateStockMovementCommand {
    type Result = stock_movement::Model;

    #[instrument(skip(self, db_pool, _event_sender), fields(movement_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        _event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;
        let db = db_pool.as_ref();

        let existing = stock_movement::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Stock movement", self.id))?;

        let mut active: stock_movement::ActiveModel = existing.into();
        active.serial_number = Set(self.input.serial_number.trim().to_string());
        active.movement_type = Set(self.input.movement_type);
        active.movement_number = Set(self.input.movement_number.trim().to_string());
        let updated = active.update(db).await?;

        info!("Stock movement updated");
        Ok(updated)
    }
}
