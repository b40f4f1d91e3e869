use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Total cost of ownership of a printer. `acquisition_total` is the sum of
/// the device price, the four taxes and accessories.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "tcos")]
#[schema(as = Tco)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub model: String,
    pub manufacturer: String,
    pub kind: String,
    pub device_price: Decimal,
    pub pis: Decimal,
    pub ipi: Decimal,
    pub icms: Decimal,
    pub cofins: Decimal,
    pub accessories: Decimal,
    pub notes: Option<String>,
    pub acquisition_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tco_operational_cost::Entity")]
    OperationalCosts,
    #[sea_orm(has_many = "super::tco_indirect_cost::Entity")]
    IndirectCosts,
}

impl Related<super::tco_operational_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperationalCosts.def()
    }
}

impl Related<super::tco_indirect_cost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndirectCosts.def()
    }
}

impl crate::db::writer::Identified for Model {
    fn row_id(&self) -> Uuid {
        self.id
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(Some(now));
        Ok(active_model)
    }
}
