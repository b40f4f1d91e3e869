use crate::{
    calculations::{return_figures, ReturnFigures, TonerProfile},
    commands::returns::{
        record_returned_unit_command::RecordReturnedUnitCommand,
        update_returned_unit_command::UpdateReturnedUnitCommand,
    },
    commands::{non_negative, Command},
    db::DbPool,
    entities::{
        returned_unit::{self, Destination},
        toner, unit,
    },
    errors::ServiceError,
    events::EventSender,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    delete_row, display_date,
    listing::{ListFilter, Searchable},
};

/// A returned unit as the list view shows it, with the toner model and
/// unit name resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnedUnitRow {
    #[serde(flatten)]
    pub record: returned_unit::Model,
    pub toner_model: String,
    pub unit_name: String,
}

impl Searchable for ReturnedUnitRow {
    fn search_fields(&self) -> Vec<String> {
        let r = &self.record;
        vec![
            r.client_code.to_string(),
            self.toner_model.clone(),
            self.unit_name.clone(),
            r.returned_weight.to_string(),
            r.destination.to_string(),
            r.remaining_weight.to_string(),
            r.remaining_pages.to_string(),
            r.usable_percentage.to_string(),
            r.recovered_value.to_string(),
            display_date(&r.created_at),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnPreviewRequest {
    pub toner_id: Uuid,
    #[validate(custom = "non_negative")]
    pub returned_weight: Decimal,
    pub destination: Destination,
}

#[derive(Clone)]
pub struct ReturnedUnitService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ReturnedUnitService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command))]
    pub async fn record_returned_unit(
        &self,
        command: RecordReturnedUnitCommand,
    ) -> Result<returned_unit::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_returned_units(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<ReturnedUnitRow>, ServiceError> {
        filter.validate_range()?;
        let db = self.db_pool.as_ref();
        let records = filter
            .apply_date_range(returned_unit::Entity::find(), returned_unit::Column::CreatedAt)
            .order_by_desc(returned_unit::Column::CreatedAt)
            .all(db)
            .await?;

        let toner_ids: Vec<Uuid> = records.iter().map(|r| r.toner_id).collect();
        let unit_ids: Vec<Uuid> = records.iter().map(|r| r.unit_id).collect();
        let toners: HashMap<Uuid, String> = toner::Entity::find()
            .filter(toner::Column::Id.is_in(toner_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.model))
            .collect();
        let units: HashMap<Uuid, String> = unit::Entity::find()
            .filter(unit::Column::Id.is_in(unit_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let rows = records
            .into_iter()
            .map(|record| ReturnedUnitRow {
                toner_model: toners.get(&record.toner_id).cloned().unwrap_or_default(),
                unit_name: units.get(&record.unit_id).cloned().unwrap_or_default(),
                record,
            })
            .collect();
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self))]
    pub async fn get_returned_unit(&self, id: Uuid) -> Result<returned_unit::Model, ServiceError> {
        returned_unit::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Returned unit", id))
    }

    #[instrument(skip(self, command), fields(returned_unit_id = %command.id))]
    pub async fn update_returned_unit(
        &self,
        command: UpdateReturnedUnitCommand,
    ) -> Result<returned_unit::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_returned_unit(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_row::<returned_unit::Entity>(
            self.db_pool.as_ref(),
            &self.event_sender,
            "Returned unit",
            id,
        )
        .await
    }

    /// Figures and destination advice for a unit being weighed.
    #[instrument(skip(self, request), fields(toner_id = %request.toner_id))]
    pub async fn preview(&self, request: &ReturnPreviewRequest) -> Result<ReturnFigures, ServiceError> {
        request.validate()?;
        let toner = toner::Entity::find_by_id(request.toner_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Toner", request.toner_id))?;

        Ok(return_figures(
            &TonerProfile::from(&toner),
            request.returned_weight,
            request.destination,
        ))
    }
}
