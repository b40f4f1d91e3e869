use crate::{
    db::DbPool,
    entities::{returned_unit, unit},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::listing::{ListFilter, Searchable};

impl Searchable for unit::Model {
    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone(), super::display_date(&self.created_at)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UnitInput {
    #[validate(length(min = 1, max = 120, message = "Unit name cannot be empty"))]
    pub name: String,
}

/// Sites and branches
#[derive(Clone)]
pub struct UnitService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UnitService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_unit(&self, input: UnitInput) -> Result<unit::Model, ServiceError> {
        input.validate()?;
        let created = unit::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await?;
        info!(unit_id = %created.id, "Unit registered");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_units(&self, filter: &ListFilter) -> Result<Vec<unit::Model>, ServiceError> {
        filter.validate_range()?;
        let rows = filter
            .apply_date_range(unit::Entity::find(), unit::Column::CreatedAt)
            .order_by_asc(unit::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self, input))]
    pub async fn rename_unit(&self, id: Uuid, input: UnitInput) -> Result<unit::Model, ServiceError> {
        input.validate()?;
        let db = self.db_pool.as_ref();
        let existing = unit::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Unit", id))?;

        let mut active: unit::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        Ok(active.update(db).await?)
    }

    /// Deletes the unit after its returned units.
    #[instrument(skip(self))]
    pub async fn delete_unit(&self, id: Uuid) -> Result<u64, ServiceError> {
        let db = self.db_pool.as_ref();
        if unit::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(ServiceError::not_found("Unit", id));
        }

        let returned_units = returned_unit::Entity::delete_many()
            .filter(returned_unit::Column::UnitId.eq(id))
            .exec(db)
            .await?
            .rows_affected;
        unit::Entity::delete_by_id(id).exec(db).await?;

        self.event_sender
            .send_or_log(Event::UnitDeleted {
                unit_id: id,
                returned_units,
            })
            .await;
        info!(unit_id = %id, returned_units, "Unit deleted");
        Ok(returned_units)
    }
}
