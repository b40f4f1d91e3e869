use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(48))")]
pub enum MovementType {
    #[sea_orm(string_value = "StockToQuarantine")]
    StockToQuarantine,
    #[sea_orm(string_value = "QuarantineToPrintTechnicalArea")]
    QuarantineToPrintTechnicalArea,
    #[sea_orm(string_value = "QuarantineToMobileTechnicalArea")]
    QuarantineToMobileTechnicalArea,
    #[sea_orm(string_value = "PackagingToLogistics")]
    PackagingToLogistics,
}

impl MovementType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StockToQuarantine => "Stock to Quarantine",
            Self::QuarantineToPrintTechnicalArea => "Quarantine to Print Technical Area",
            Self::QuarantineToMobileTechnicalArea => "Quarantine to Mobile Technical Area",
            Self::PackagingToLogistics => "Packaging to Logistics",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "stock_movements")]
#[schema(as = StockMovement)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub serial_number: String,
    pub movement_type: MovementType,
    pub movement_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
