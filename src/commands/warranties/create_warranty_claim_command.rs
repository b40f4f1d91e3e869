use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::warranty_claim,
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

use super::WarrantyClaimInput;

lazy_static! {
    static ref WARRANTY_CLAIMS: IntCounter = crate::metrics::int_counter(
        "warranty_claims_created_total",
        "Total number of warranty claims registered"
    );
    static ref WARRANTY_CLAIM_FAILURES: IntCounter = crate::metrics::int_counter(
        "warranty_claim_failures_total",
        "Total number of failed warranty claim registrations"
    );
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateWarrantyClaimCommand {
    #[serde(flatten)]
    pub input: WarrantyClaimInput,
}

#[async_trait]
impl Command for CreateWarrantyClaimCommand {
    type Result = warranty_claim::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(supplier = %self.input.supplier))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate().map_err(|e| {
            WARRANTY_CLAIM_FAILURES.inc();
            ServiceError::from(e)
        })?;

        let mut claim = warranty_claim::ActiveModel {
            id: Set(Uuid::new_v4()),
            ..Default::default()
        };
        self.input.apply(&mut claim);

        let created = claim.insert(db_pool.as_ref()).await.map_err(|e| {
            WARRANTY_CLAIM_FAILURES.inc();
            error!("Failed to create warranty claim: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        event_sender
            .send_or_log(Event::WarrantyClaimCreated(created.id))
            .await;
        info!(claim_id = %created.id, status = %created.status, "Warranty claim registered");
        WARRANTY_CLAIMS.inc();

        Ok(created)
    }
}
