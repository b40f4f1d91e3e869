use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::warranty_claim,
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::WarrantyClaimInput;

#[derive(Debug, Clone)]
pub struct UpdateWarrantyClaimCommand {
    pub id: Uuid,
    pub input: WarrantyClaimInput,
}

#[async_trait]
impl Command for UpdateWarrantyClaimCommand {
    type Result = warranty_claim::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(claim_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;
        let db = db_pool.as_ref();

        let existing = warranty_claim::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Warranty claim", self.id))?;

        let mut active: warranty_claim::ActiveModel = existing.into();
        self.input.apply(&mut active);
        let updated = active.update(db).await?;

        event_sender
            .send_or_log(Event::WarrantyClaimUpdated(updated.id))
            .await;
        info!(status = %updated.status, "Warranty claim updated");
        Ok(updated)
    }
}
