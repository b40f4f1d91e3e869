use crate::{
    commands::audits::{
        create_audit_form_command::CreateAuditFormCommand,
        record_audit_command::RecordAuditCommand,
    },
    commands::Command,
    db::{DbPool, WriteOutcome},
    entities::{audit_form, audit_item, audit_record, audit_response, audit_section, unit},
    errors::ServiceError,
    events::EventSender,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    display_date,
    listing::{ListFilter, Searchable},
};

impl Searchable for audit_form::Model {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.auditor.clone().unwrap_or_default(),
            display_date(&self.created_at),
        ]
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditSectionDetail {
    #[serde(flatten)]
    pub section: audit_section::Model,
    pub items: Vec<audit_item::Model>,
}

/// A form template with its sections and items in display order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditFormDetail {
    #[serde(flatten)]
    pub form: audit_form::Model,
    pub sections: Vec<AuditSectionDetail>,
}

/// An audit record as the list view shows it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditRecordRow {
    #[serde(flatten)]
    pub record: audit_record::Model,
    pub form_title: String,
    pub unit_name: String,
    pub non_conforming: usize,
}

impl Searchable for AuditRecordRow {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.form_title.clone(),
            self.unit_name.clone(),
            self.record.auditor.clone(),
            self.record.audited_on.format("%d/%m/%Y").to_string(),
            display_date(&self.record.created_at),
        ]
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditRecordDetail {
    #[serde(flatten)]
    pub record: audit_record::Model,
    pub responses: Vec<audit_response::Model>,
}

#[derive(Clone)]
pub struct AuditService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AuditService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command))]
    pub async fn create_form(
        &self,
        command: CreateAuditFormCommand,
    ) -> Result<WriteOutcome<audit_form::Model>, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_forms(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<audit_form::Model>, ServiceError> {
        filter.validate_range()?;
        let rows = filter
            .apply_date_range(audit_form::Entity::find(), audit_form::Column::CreatedAt)
            .order_by_desc(audit_form::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self))]
    pub async fn get_form(&self, id: Uuid) -> Result<AuditFormDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let form = audit_form::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Audit form", id))?;

        let sections = audit_section::Entity::find()
            .filter(audit_section::Column::FormId.eq(id))
            .order_by_asc(audit_section::Column::Position)
            .all(db)
            .await?;
        let mut items_by_section: HashMap<Uuid, Vec<audit_item::Model>> = HashMap::new();
        for item in audit_item::Entity::find()
            .filter(audit_item::Column::SectionId.is_in(sections.iter().map(|s| s.id)))
            .order_by_asc(audit_item::Column::Position)
            .all(db)
            .await?
        {
            items_by_section.entry(item.section_id).or_default().push(item);
        }

        let sections = sections
            .into_iter()
            .map(|section| AuditSectionDetail {
                items: items_by_section.remove(&section.id).unwrap_or_default(),
                section,
            })
            .collect();
        Ok(AuditFormDetail { form, sections })
    }

    #[instrument(skip(self, command))]
    pub async fn record_audit(
        &self,
        command: RecordAuditCommand,
    ) -> Result<WriteOutcome<audit_record::Model>, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        filter: &ListFilter,
    ) -> Result<Vec<AuditRecordRow>, ServiceError> {
        filter.validate_range()?;
        let db = self.db_pool.as_ref();
        let records = filter
            .apply_date_range(audit_record::Entity::find(), audit_record::Column::CreatedAt)
            .order_by_desc(audit_record::Column::CreatedAt)
            .all(db)
            .await?;

        let titles: HashMap<Uuid, String> = audit_form::Entity::find()
            .filter(audit_form::Column::Id.is_in(records.iter().map(|r| r.form_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|f| (f.id, f.title))
            .collect();
        let units: HashMap<Uuid, String> = unit::Entity::find()
            .filter(unit::Column::Id.is_in(records.iter().map(|r| r.unit_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();
        let mut failures: HashMap<Uuid, usize> = HashMap::new();
        for response in audit_response::Entity::find()
            .filter(audit_response::Column::RecordId.is_in(records.iter().map(|r| r.id)))
            .filter(audit_response::Column::Conforming.eq(false))
            .all(db)
            .await?
        {
            *failures.entry(response.record_id).or_default() += 1;
        }

        let rows = records
            .into_iter()
            .map(|record| AuditRecordRow {
                form_title: titles.get(&record.form_id).cloned().unwrap_or_default(),
                unit_name: units.get(&record.unit_id).cloned().unwrap_or_default(),
                non_conforming: failures.get(&record.id).copied().unwrap_or(0),
                record,
            })
            .collect();
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self))]
    pub async fn get_record(&self, id: Uuid) -> Result<AuditRecordDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let record = audit_record::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Audit record", id))?;
        let responses = audit_response::Entity::find()
            .filter(audit_response::Column::RecordId.eq(id))
            .all(db)
            .await?;
        Ok(AuditRecordDetail { record, responses })
    }
}
