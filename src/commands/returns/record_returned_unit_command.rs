use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::returned_unit,
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{resolve_figures, ReturnedUnitInput};

lazy_static! {
    static ref RETURNS_RECORDED: IntCounter = crate::metrics::int_counter(
        "returned_units_recorded_total",
        "Total number of returned units recorded"
    );
    static ref RETURN_FAILURES: IntCounter = crate::metrics::int_counter(
        "returned_unit_failures_total",
        "Total number of failed returned-unit registrations"
    );
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordReturnedUnitCommand {
    #[serde(flatten)]
    pub input: ReturnedUnitInput,
}

#[async_trait]
impl Command for RecordReturnedUnitCommand {
    type Result = returned_unit::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(toner_id = %self.input.toner_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate().map_err(|e| {
            RETURN_FAILURES.inc();
            ServiceError::from(e)
        })?;

        let db = db_pool.as_ref();
        let input = &self.input;
        let figures = resolve_figures(db, input).await.map_err(|e| {
            RETURN_FAILURES.inc();
            e
        })?;

        let record = returned_unit::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_code: Set(input.client_code),
            toner_id: Set(input.toner_id),
            unit_id: Set(input.unit_id),
            returned_weight: Set(input.returned_weight),
            destination: Set(input.destination),
            remaining_weight: Set(figures.remaining_weight),
            remaining_pages: Set(figures.remaining_pages),
            usable_percentage: Set(figures.usable_percentage),
            recovered_value: Set(figures.recovered_value),
            created_at: Set(Utc::now()),
        };

        let created = record.insert(db).await.map_err(|e| {
            RETURN_FAILURES.inc();
            error!("Failed to record returned unit: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        event_sender
            .send_or_log(Event::ReturnedUnitRecorded(created.id))
            .await;
        info!(
            returned_unit_id = %created.id,
            destination = %created.destination,
            recovered_value = %created.recovered_value,
            "Returned unit recorded"
        );
        RETURNS_RECORDED.inc();

        Ok(created)
    }
}
