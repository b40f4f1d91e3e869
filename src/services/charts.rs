//! Warranty claim aggregates for the dashboard charts.

use crate::{db::DbPool, entities::warranty_claim, errors::ServiceError};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};
use tracing::instrument;
use utoipa::ToSchema;

use super::listing::ListFilter;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPoint {
    pub label: String,
    pub count: u64,
    pub total_value: Decimal,
}

fn aggregate<F>(claims: &[warranty_claim::Model], key: F) -> Vec<ChartPoint>
where
    F: Fn(&warranty_claim::Model) -> String,
{
    let mut buckets: BTreeMap<String, (u64, Decimal)> = BTreeMap::new();
    for claim in claims {
        let bucket = buckets.entry(key(claim)).or_insert((0, Decimal::ZERO));
        bucket.0 += 1;
        bucket.1 += claim.total_value;
    }
    buckets
        .into_iter()
        .map(|(label, (count, total_value))| ChartPoint {
            label,
            count,
            total_value,
        })
        .collect()
}

/// Claims per request month (`YYYY-MM`), oldest first.
pub fn by_month(claims: &[warranty_claim::Model]) -> Vec<ChartPoint> {
    aggregate(claims, |c| c.requested_on.format("%Y-%m").to_string())
}

/// Claims per supplier, busiest first.
pub fn by_supplier(claims: &[warranty_claim::Model]) -> Vec<ChartPoint> {
    let mut points = aggregate(claims, |c| c.supplier.clone());
    points.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    points
}

pub fn by_status(claims: &[warranty_claim::Model]) -> Vec<ChartPoint> {
    aggregate(claims, |c| c.status.to_string())
}

#[derive(Clone)]
pub struct ChartService {
    db_pool: Arc<DbPool>,
}

impl ChartService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Claims in the requested creation-date range.
    #[instrument(skip(self))]
    pub async fn claims(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<warranty_claim::Model>, ServiceError> {
        filter.validate_range()?;
        Ok(filter
            .apply_date_range(warranty_claim::Entity::find(), warranty_claim::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?)
    }
}
