use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A filled-in audit, answering every item of one form template.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "audit_records")]
#[schema(as = AuditRecord)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub form_id: Uuid,
    pub auditor: String,
    pub unit_id: Uuid,
    pub audited_on: NaiveDate,
    pub evidence_link: Option<String>,
    pub improvement_suggestion: Option<String>,
    pub responsible_signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::audit_form::Entity",
        from = "Column::FormId",
        to = "super::audit_form::Column::Id"
    )]
    Form,
    #[sea_orm(has_many = "super::audit_response::Entity")]
    Responses,
}

impl Related<super::audit_form::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Form.def()
    }
}

impl Related<super::audit_response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responses.def()
    }
}

impl crate::db::writer::Identified for Model {
    fn row_id(&self) -> Uuid {
        self.id
    }
}

impl ActiveModelBehavior for ActiveModel {}
