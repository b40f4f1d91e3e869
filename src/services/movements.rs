use crate::{
    commands::movements::{
        record_stock_movement_command::RecordStockMovementCommand,
        update_stock_movement_command::UpdateStockMovementCommand,
    },
    commands::Command,
    db::DbPool,
    entities::stock_movement,
    errors::ServiceError,
    events::EventSender,
};
use sea_orm::{EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::{
    delete_row, display_date,
    listing::{ListFilter, Searchable},
};

impl Searchable for stock_movement::Model {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.serial_number.clone(),
            self.movement_type.label().to_string(),
            self.movement_number.clone(),
            display_date(&self.created_at),
        ]
    }
}

#[derive(Clone)]
pub struct MovementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MovementService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command))]
    pub async fn record(
        &self,
        command: RecordStockMovementCommand,
    ) -> Result<stock_movement::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        filter.validate_range()?;
        let rows = filter
            .apply_date_range(stock_movement::Entity::find(), stock_movement::Column::CreatedAt)
            .order_by_desc(stock_movement::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self, command), fields(movement_id = %command.id))]
    pub async fn update(
        &self,
        command: UpdateStockMovementCommand,
    ) -> Result<stock_movement::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_row::<stock_movement::Entity>(
            self.db_pool.as_ref(),
            &self.event_sender,
            "Stock movement",
            id,
        )
        .await
    }
}
