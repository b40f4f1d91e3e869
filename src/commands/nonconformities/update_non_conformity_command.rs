use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::non_conformity,
    errors::ServiceError,
    events::EventSender,
};
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, EntityTrait};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::NonConformityInput;

/// Edits the descriptive fields. Number and status are left alone.
#[derive(Debug, Clone)]
pub struct UpdateNonConformityCommand {
    pub id: Uuid,
    pub input: NonConformityInput,
}

#[async_trait]
impl Command for UpdateNonConformityCommand {
    type Result = non_conformity::Model;

    #[instrument(skip(self, db_pool, _event_sender), fields(nc_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        _event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;
        let db = db_pool.as_ref();

        let existing = non_conformity::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Non-conformity", self.id))?;

        let mut active: non_conformity::ActiveModel = existing.into();
        self.input.apply(&mut active);
        let updated = active.update(db).await?;

        info!(number = %updated.number, "Non-conformity updated");
        Ok(updated)
    }
}
