use crate::commands::Command;
use crate::{
    db::{DbPool, MultiStepWriter, WriteOutcome},
    entities::tco,
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::TcoInput;

/// Rewrites the header and replaces both cost collections wholesale.
#[derive(Debug, Clone)]
pub struct UpdateTcoCommand {
    pub id: Uuid,
    pub input: TcoInput,
}

#[async_trait]
impl Command for UpdateTcoCommand {
    type Result = WriteOutcome<tco::Model>;

    #[instrument(skip(self, db_pool, event_sender), fields(tco_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;
        let db = db_pool.as_ref();

        let existing = tco::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("TCO", self.id))?;

        let mut active: tco::ActiveModel = existing.into();
        self.input.apply(&mut active);

        let outcome = MultiStepWriter::new(db)
            .child(self.input.operational_rows())
            .child(self.input.indirect_rows())
            .replace(active)
            .await?;

        event_sender.send_or_log(Event::TcoUpdated(self.id)).await;
        info!(acquisition_total = %outcome.parent.acquisition_total, "TCO record updated");
        Ok(outcome)
    }
}
