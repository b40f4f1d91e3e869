use crate::commands::Command;
use crate::{
    db::{DbPool, MultiStepWriter, WriteOutcome},
    entities::{audit_form, unit},
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{AuditFormInput, SectionTree, ITEMS, SECTIONS};

lazy_static! {
    static ref AUDIT_FORMS: IntCounter = crate::metrics::int_counter(
        "audit_forms_created_total",
        "Total number of audit form templates created"
    );
}

#[derive(Debug, Clone)]
pub struct CreateAuditFormCommand {
    pub input: AuditFormInput,
}

#[async_trait]
impl Command for CreateAuditFormCommand {
    type Result = WriteOutcome<audit_form::Model>;

    #[instrument(skip(self, db_pool, event_sender), fields(title = %self.input.title))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.input.validate()?;
        let db = db_pool.as_ref();
        let input = &self.input;

        if let Some(unit_id) = input.unit_id {
            unit::Entity::find_by_id(unit_id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Unit", unit_id))?;
        }

        let form = audit_form::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title.trim().to_string()),
            auditor: Set(input.auditor.clone()),
            audit_date: Set(input.audit_date),
            unit_id: Set(input.unit_id),
            evidence_link: Set(input.evidence_link.clone()),
            gap_notes: Set(input.gap_notes.clone()),
            improvement_notes: Set(input.improvement_notes.clone()),
            responsible_signature: Set(input.responsible_signature.clone()),
            created_at: Set(Utc::now()),
        };

        let tree = SectionTree {
            sections: input.sections.clone(),
        };
        let items = tree.item_count();
        let mut outcome = MultiStepWriter::new(db).child(tree).insert(form).await?;
        outcome.children.push((ITEMS, items));

        event_sender
            .send_or_log(Event::AuditFormCreated(outcome.parent.id))
            .await;
        info!(
            form_id = %outcome.parent.id,
            sections = outcome.rows(SECTIONS),
            items = outcome.rows(ITEMS),
            "Audit form template created"
        );
        AUDIT_FORMS.inc();

        Ok(outcome)
    }
}
