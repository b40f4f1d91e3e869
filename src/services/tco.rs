use crate::{
    calculations::{itemized_total, CostRow},
    commands::tco::{create_tco_command::CreateTcoCommand, update_tco_command::UpdateTcoCommand, TcoInput},
    commands::Command,
    db::{DbPool, WriteOutcome},
    entities::{tco, tco_indirect_cost, tco_operational_cost},
    errors::ServiceError,
    events::EventSender,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    delete_row, display_date,
    listing::{ListFilter, Searchable},
};

impl Searchable for tco::Model {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.model.clone(),
            self.manufacturer.clone(),
            self.kind.clone(),
            self.acquisition_total.to_string(),
            self.notes.clone().unwrap_or_default(),
            display_date(&self.created_at),
        ]
    }
}

/// Live totals for a TCO form. Monthly totals count every row, saved or not.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TcoTotals {
    pub acquisition_total: Decimal,
    pub operational_monthly_total: Decimal,
    pub indirect_monthly_total: Decimal,
}

impl TcoTotals {
    pub fn of(input: &TcoInput) -> Self {
        Self {
            acquisition_total: input.acquisition_total(),
            operational_monthly_total: itemized_total(&input.operational_costs),
            indirect_monthly_total: itemized_total(&input.indirect_costs),
        }
    }
}

/// A TCO record with both cost collections loaded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TcoDetail {
    #[serde(flatten)]
    pub tco: tco::Model,
    pub operational_costs: Vec<CostRow>,
    pub indirect_costs: Vec<CostRow>,
    pub operational_monthly_total: Decimal,
    pub indirect_monthly_total: Decimal,
}

impl TcoDetail {
    fn new(tco: tco::Model, operational_costs: Vec<CostRow>, indirect_costs: Vec<CostRow>) -> Self {
        Self {
            operational_monthly_total: itemized_total(&operational_costs),
            indirect_monthly_total: itemized_total(&indirect_costs),
            tco,
            operational_costs,
            indirect_costs,
        }
    }
}

#[derive(Clone)]
pub struct TcoService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl TcoService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command))]
    pub async fn create_tco(
        &self,
        command: CreateTcoCommand,
    ) -> Result<WriteOutcome<tco::Model>, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(tco_id = %command.id))]
    pub async fn update_tco(
        &self,
        command: UpdateTcoCommand,
    ) -> Result<WriteOutcome<tco::Model>, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_tcos(&self, filter: &ListFilter) -> Result<Vec<tco::Model>, ServiceError> {
        filter.validate_range()?;
        let rows = filter
            .apply_date_range(tco::Entity::find(), tco::Column::CreatedAt)
            .order_by_desc(tco::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self))]
    pub async fn get_tco(&self, id: Uuid) -> Result<TcoDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let tco = tco::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("TCO", id))?;

        let operational = tco_operational_cost::Entity::find()
            .filter(tco_operational_cost::Column::TcoId.eq(id))
            .order_by_asc(tco_operational_cost::Column::Label)
            .all(db)
            .await?
            .into_iter()
            .map(|row| CostRow {
                label: row.label,
                value: row.value,
            })
            .collect();
        let indirect = tco_indirect_cost::Entity::find()
            .filter(tco_indirect_cost::Column::TcoId.eq(id))
            .order_by_asc(tco_indirect_cost::Column::Label)
            .all(db)
            .await?
            .into_iter()
            .map(|row| CostRow {
                label: row.label,
                value: row.value,
            })
            .collect();

        Ok(TcoDetail::new(tco, operational, indirect))
    }

    /// Cost rows go with the parent through the foreign-key cascade.
    #[instrument(skip(self))]
    pub async fn delete_tco(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_row::<tco::Entity>(self.db_pool.as_ref(), &self.event_sender, "TCO", id).await
    }

    pub fn preview(&self, input: &TcoInput) -> Result<TcoTotals, ServiceError> {
        input.validate()?;
        Ok(TcoTotals::of(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tco::sample_input;
    use rust_decimal_macros::dec;

    #[test]
    fn live_totals_include_rows_that_will_not_be_saved() {
        let totals = TcoTotals::of(&sample_input());
        assert_eq!(totals.acquisition_total, dec!(1080));
        // "" / 12 and "Toner" / 0 are shown but not persisted
        assert_eq!(totals.operational_monthly_total, dec!(52));
        assert_eq!(totals.indirect_monthly_total, dec!(8.5));
    }
}
