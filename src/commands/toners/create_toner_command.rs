use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::toner,
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::TonerInput;

lazy_static! {
    static ref TONER_CREATIONS: IntCounter =
        crate::metrics::int_counter("toner_creations_total", "Total number of toners registered");
    static ref TONER_CREATION_FAILURES: IntCounter = crate::metrics::int_counter(
        "toner_creation_failures_total",
        "Total number of failed toner registrations"
    );
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTonerCommand {
    #[serde(flatten)]
    pub input: TonerInput,
}

#[async_trait]
impl Command for CreateTonerCommand {
    type Result = toner::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(model = %self.input.model))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate().map_err(|e| {
            TONER_CREATION_FAILURES.inc();
            ServiceError::from(e)
        })?;

        let input = &self.input;
        let figures = input.figures();
        let toner = toner::ActiveModel {
            id: Set(Uuid::new_v4()),
            model: Set(input.model.trim().to_string()),
            gross_weight: Set(input.gross_weight),
            empty_weight: Set(input.empty_weight),
            compatible_printers: Set(input.compatible_printers.clone()),
            color: Set(input.color),
            print_coverage: Set(input.print_coverage),
            page_yield: Set(input.page_yield),
            kind: Set(input.kind),
            unit_price: Set(input.unit_price),
            price_per_page: Set(figures.price_per_page),
            net_weight: Set(figures.net_weight),
            ..Default::default()
        };

        let created = toner.insert(db_pool.as_ref()).await.map_err(|e| {
            TONER_CREATION_FAILURES.inc();
            error!("Failed to create toner: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        event_sender.send_or_log(Event::TonerCreated(created.id)).await;

        info!(
            toner_id = %created.id,
            price_per_page = %created.price_per_page,
            "Toner registered"
        );
        TONER_CREATIONS.inc();

        Ok(created)
    }
}
