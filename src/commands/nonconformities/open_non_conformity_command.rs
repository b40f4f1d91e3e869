use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::non_conformity::{self, CaseStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{allocate_nc_number, NonConformityInput};

lazy_static! {
    static ref NC_OPENED: IntCounter = crate::metrics::int_counter(
        "non_conformities_opened_total",
        "Total number of non-conformities opened"
    );
    static ref NC_OPEN_FAILURES: IntCounter = crate::metrics::int_counter(
        "non_conformity_open_failures_total",
        "Total number of failed non-conformity registrations"
    );
}

/// Opens a non-conformity. The `NC-YYYY-NNNN` number is allocated in the
/// same transaction as the insert, so a failed insert burns no number.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenNonConformityCommand {
    #[serde(flatten)]
    pub input: NonConformityInput,
}

#[async_trait]
impl Command for OpenNonConformityCommand {
    type Result = non_conformity::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(severity = %self.input.severity))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate().map_err(|e| {
            NC_OPEN_FAILURES.inc();
            ServiceError::from(e)
        })?;

        let txn = db_pool.begin().await?;
        let number = allocate_nc_number(&txn, Utc::now().year()).await?;

        let mut nc = non_conformity::ActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(number),
            status: Set(CaseStatus::Open),
            closed_at: Set(None),
            ..Default::default()
        };
        self.input.apply(&mut nc);

        let created = match nc.insert(&txn).await {
            Ok(created) => created,
            Err(e) => {
                NC_OPEN_FAILURES.inc();
                error!("Failed to open non-conformity: {}", e);
                txn.rollback().await?;
                return Err(ServiceError::DatabaseError(e));
            }
        };
        txn.commit().await?;

        event_sender
            .send_or_log(Event::NonConformityOpened {
                id: created.id,
                number: created.number.clone(),
            })
            .await;
        info!(nc_id = %created.id, number = %created.number, "Non-conformity opened");
        NC_OPENED.inc();

        Ok(created)
    }
}
