use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Audit form template: a title, header defaults and an ordered tree of
/// sections and items.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "audit_forms")]
#[schema(as = AuditForm)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub auditor: Option<String>,
    pub audit_date: Option<NaiveDate>,
    pub unit_id: Option<Uuid>,
    pub evidence_link: Option<String>,
    pub gap_notes: Option<String>,
    pub improvement_notes: Option<String>,
    pub responsible_signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::audit_section::Entity")]
    Sections,
}

impl Related<super::audit_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl crate::db::writer::Identified for Model {
    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl ActiveModelBehavior for ActiveModel {}
