use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::toner,
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::TonerInput;

/// Replaces the editable fields of a toner and recomputes the derived ones.
///
/// Returned units already recorded keep the figures they were stored with.
#[derive(Debug, Clone)]
pub struct UpdateTonerCommand {
    pub id: Uuid,
    pub input: TonerInput,
}

#[async_trait]
impl Command for UpdateTonerCommand {
    type Result = toner::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(toner_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;
        let db = db_pool.as_ref();

        let existing = toner::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Toner", self.id))?;

        let input = &self.input;
        let figures = input.figures();
        let mut active: toner::ActiveModel = existing.into();
        active.model = Set(input.model.trim().to_string());
        active.gross_weight = Set(input.gross_weight);
        active.empty_weight = Set(input.empty_weight);
        active.compatible_printers = Set(input.compatible_printers.clone());
        active.color = Set(input.color);
        active.print_coverage = Set(input.print_coverage);
        active.page_yield = Set(input.page_yield);
        active.kind = Set(input.kind);
        active.unit_price = Set(input.unit_price);
        active.price_per_page = Set(figures.price_per_page);
        active.net_weight = Set(figures.net_weight);

        let updated = active.update(db).await?;
        event_sender.send_or_log(Event::TonerUpdated(updated.id)).await;
        info!(price_per_page = %updated.price_per_page, "Toner updated");

        Ok(updated)
    }
}
