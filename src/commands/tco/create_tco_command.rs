use crate::commands::Command;
use crate::{
    db::{DbPool, MultiStepWriter, WriteOutcome},
    entities::tco,
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::Set;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{TcoInput, INDIRECT_COSTS, OPERATIONAL_COSTS};

lazy_static! {
    static ref TCO_CREATIONS: IntCounter =
        crate::metrics::int_counter("tco_creations_total", "Total number of TCO records created");
    static ref TCO_PARTIAL_WRITES: IntCounter = crate::metrics::int_counter(
        "tco_partial_writes_total",
        "TCO writes that stored the parent but failed on a cost collection"
    );
}

/// Saves the TCO header, then its operational and indirect cost rows.
/// A failing cost collection leaves the header in place.
#[derive(Debug, Clone)]
pub struct CreateTcoCommand {
    pub input: TcoInput,
}

#[async_trait]
impl Command for CreateTcoCommand {
    type Result = WriteOutcome<tco::Model>;

    #[instrument(skip(self, db_pool, event_sender), fields(model = %self.input.model))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;

        let mut parent = tco::ActiveModel {
            id: Set(Uuid::new_v4()),
            ..Default::default()
        };
        self.input.apply(&mut parent);

        let outcome = MultiStepWriter::new(db_pool.as_ref())
            .child(self.input.operational_rows())
            .child(self.input.indirect_rows())
            .insert(parent)
            .await
            .map_err(|e| {
                if let ServiceError::PartialWrite { parent_id, .. } = &e {
                    TCO_PARTIAL_WRITES.inc();
                    error!(%parent_id, "TCO cost rows were not fully saved: {}", e);
                }
                e
            })?;

        event_sender
            .send_or_log(Event::TcoCreated(outcome.parent.id))
            .await;
        info!(
            tco_id = %outcome.parent.id,
            acquisition_total = %outcome.parent.acquisition_total,
            operational_rows = outcome.rows(OPERATIONAL_COSTS),
            indirect_rows = outcome.rows(INDIRECT_COSTS),
            "TCO record created"
        );
        TCO_CREATIONS.inc();

        Ok(outcome)
    }
}
