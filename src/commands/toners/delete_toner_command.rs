use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::{returned_unit, toner},
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Deletes a toner after deleting every returned unit that references it.
#[derive(Debug, Clone)]
pub struct DeleteTonerCommand {
    pub id: Uuid,
}

#[async_trait]
impl Command for DeleteTonerCommand {
    /// Number of returned units removed along with the toner.
    type Result = u64;

    #[instrument(skip(self, db_pool, event_sender), fields(toner_id = %self.id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = db_pool.as_ref();

        if toner::Entity::find_by_id(self.id).one(db).await?.is_none() {
            return Err(ServiceError::not_found("Toner", self.id));
        }

        let returned_units = returned_unit::Entity::delete_many()
            .filter(returned_unit::Column::TonerId.eq(self.id))
            .exec(db)
            .await?
            .rows_affected;

        let deleted = toner::Entity::delete_by_id(self.id).exec(db).await?;
        if deleted.rows_affected == 0 {
            warn!("Toner vanished before delete");
            return Err(ServiceError::not_found("Toner", self.id));
        }

        event_sender
            .send_or_log(Event::TonerDeleted {
                toner_id: self.id,
                returned_units,
            })
            .await;
        info!(returned_units, "Toner deleted");

        Ok(returned_units)
    }
}
