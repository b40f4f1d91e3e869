use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::returned_unit,
    errors::ServiceError,
    events::EventSender,
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{resolve_figures, ReturnedUnitInput};

/// Inline edit of a returned unit; derived figures are recomputed against
/// the toner's current data.
#[derive(Debug, Clone)]
pub struct UpdateReturnedUnitCommand {
    pub id: Uuid,
    pub input: ReturnedUnitInput,
}

#[async_trait]
impl Command for UpdateReturnedUnitCommand {
    type Result = returned_unit::Model;

    #[instrument(skip(self, db_pool, _event_sender), fields(returned_unit_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        _event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;
        let db = db_pool.as_ref();

        let existing = returned_unit::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Returned unit", self.id))?;
        let figures = resolve_figures(db, &self.input).await?;

        let input = &self.input;
        let mut active: returned_unit::ActiveModel = existing.into();
        active.client_code = Set(input.client_code);
        active.toner_id = Set(input.toner_id);
        active.unit_id = Set(input.unit_id);
        active.returned_weight = Set(input.returned_weight);
        active.destination = Set(input.destination);
        active.remaining_weight = Set(figures.remaining_weight);
        active.remaining_pages = Set(figures.remaining_pages);
        active.usable_percentage = Set(figures.usable_percentage);
        active.recovered_value = Set(figures.recovered_value);

        let updated = active.update(db).await?;
        info!(destination = %updated.destination, "Returned unit updated");
        Ok(updated)
    }
}
