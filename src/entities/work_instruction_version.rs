use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One uploaded revision of a work instruction. `view_log` is a JSON array
/// of `{ "viewer": ..., "viewed_at": ... }` entries, appended on every view.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "work_instruction_versions")]
#[schema(as = WorkInstructionVersion)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub instruction_id: Uuid,
    pub version: Decimal,
    pub file_url: String,
    pub storage_path: String,
    #[schema(value_type = Vec<Object>)]
    pub view_log: Json,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_instruction::Entity",
        from = "Column::InstructionId",
        to = "super::work_instruction::Column::Id"
    )]
    Instruction,
}

impl Related<super::work_instruction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instruction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
