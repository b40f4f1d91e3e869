use crate::{
    commands::warranties::{
        create_warranty_claim_command::CreateWarrantyClaimCommand,
        update_warranty_claim_command::UpdateWarrantyClaimCommand,
    },
    commands::Command,
    db::DbPool,
    entities::warranty_claim,
    errors::ServiceError,
    events::EventSender,
};
use sea_orm::{EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::{
    delete_row, display_date,
    listing::{ListFilter, Searchable},
};

impl Searchable for warranty_claim::Model {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.requester.clone(),
            self.requested_on.format("%d/%m/%Y").to_string(),
            self.product_code.clone(),
            self.serial_number.clone(),
            self.item_type.to_string(),
            self.purchase_invoice.clone(),
            self.shipment_invoice.clone(),
            self.return_invoice.clone(),
            self.ticket_number.clone(),
            self.status.to_string(),
            self.supplier.clone(),
            self.quantity.to_string(),
            self.defect_notes.clone(),
            self.total_value.to_string(),
            display_date(&self.created_at),
        ];
        if let Some(date) = self.warranty_date {
            fields.push(date.format("%d/%m/%Y").to_string());
        }
        fields
    }
}

/// Service for warranty claims against suppliers
#[derive(Clone)]
pub struct WarrantyService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl WarrantyService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a new warranty claim
    #[instrument(skip(self, command))]
    pub async fn create_claim(
        &self,
        command: CreateWarrantyClaimCommand,
    ) -> Result<warranty_claim::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Lists claims, newest first
    #[instrument(skip(self))]
    pub async fn list_claims(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<warranty_claim::Model>, ServiceError> {
        filter.validate_range()?;
        let rows = filter
            .apply_date_range(warranty_claim::Entity::find(), warranty_claim::Column::CreatedAt)
            .order_by_desc(warranty_claim::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(filter.apply_search(rows))
    }

    /// Gets a claim by ID
    #[instrument(skip(self))]
    pub async fn get_claim(&self, id: Uuid) -> Result<warranty_claim::Model, ServiceError> {
        warranty_claim::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Warranty claim", id))
    }

    #[instrument(skip(self, command), fields(claim_id = %command.id))]
    pub async fn update_claim(
        &self,
        command: UpdateWarrantyClaimCommand,
    ) -> Result<warranty_claim::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_claim(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_row::<warranty_claim::Entity>(
            self.db_pool.as_ref(),
            &self.event_sender,
            "Warranty claim",
            id,
        )
        .await
    }
}
