use crate::commands::{valid_percentage, Command};
use crate::{
    db::{writer::RowBatch, DbPool, MultiStepWriter, WriteOutcome},
    entities::{audit_form, audit_item, audit_record, audit_response, audit_section, unit},
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::RESPONSES;

lazy_static! {
    static ref AUDITS_RECORDED: IntCounter =
        crate::metrics::int_counter("audits_recorded_total", "Total number of audits recorded");
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuditAnswer {
    pub item_id: Uuid,
    #[serde(default = "conforming_by_default")]
    pub conforming: bool,
    #[validate(custom = "valid_percentage")]
    pub percentage: Option<Decimal>,
    pub notes: Option<String>,
}

fn conforming_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordAuditCommand {
    pub form_id: Uuid,
    #[validate(length(min = 1, message = "Auditor cannot be empty"))]
    pub auditor: String,
    pub unit_id: Uuid,
    pub audited_on: NaiveDate,
    pub evidence_link: Option<String>,
    pub improvement_suggestion: Option<String>,
    pub responsible_signature: Option<String>,
    #[validate]
    #[serde(default)]
    pub answers: Vec<AuditAnswer>,
}

impl RecordAuditCommand {
    /// One answer per template item, in template order. Items left
    /// unanswered count as conforming.
    fn complete_answers(
        &self,
        items: &[audit_item::Model],
    ) -> Result<Vec<AuditAnswer>, ServiceError> {
        let mut given: HashMap<Uuid, &AuditAnswer> =
            self.answers.iter().map(|a| (a.item_id, a)).collect();

        let answers = items
            .iter()
            .map(|item| match given.remove(&item.id) {
                Some(answer) => answer.clone(),
                None => AuditAnswer {
                    item_id: item.id,
                    conforming: true,
                    percentage: None,
                    notes: None,
                },
            })
            .collect();

        if let Some(stray) = given.keys().next() {
            return Err(ServiceError::ValidationError(format!(
                "Item {} does not belong to form {}",
                stray, self.form_id
            )));
        }
        Ok(answers)
    }
}

async fn form_items(
    db: &DbPool,
    form_id: Uuid,
) -> Result<Vec<audit_item::Model>, ServiceError> {
    let sections = audit_section::Entity::find()
        .filter(audit_section::Column::FormId.eq(form_id))
        .order_by_asc(audit_section::Column::Position)
        .all(db)
        .await?;
    let section_ids: Vec<Uuid> = sections.iter().map(|s| s.id).collect();
    let items = audit_item::Entity::find()
        .filter(audit_item::Column::SectionId.is_in(section_ids.clone()))
        .order_by_asc(audit_item::Column::Position)
        .all(db)
        .await?;

    let mut ordered = Vec::with_capacity(items.len());
    for section_id in section_ids {
        ordered.extend(items.iter().filter(|i| i.section_id == section_id).cloned());
    }
    Ok(ordered)
}

#[async_trait]
impl Command for RecordAuditCommand {
    type Result = WriteOutcome<audit_record::Model>;

    #[instrument(skip(self, db_pool, event_sender), fields(form_id = %self.form_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;
        let db = db_pool.as_ref();

        audit_form::Entity::find_by_id(self.form_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Audit form", self.form_id))?;
        unit::Entity::find_by_id(self.unit_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Unit", self.unit_id))?;

        let items = form_items(db, self.form_id).await?;
        let answers = self.complete_answers(&items)?;

        let record = audit_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            form_id: Set(self.form_id),
            auditor: Set(self.auditor.trim().to_string()),
            unit_id: Set(self.unit_id),
            audited_on: Set(self.audited_on),
            evidence_link: Set(self.evidence_link.clone()),
            improvement_suggestion: Set(self.improvement_suggestion.clone()),
            responsible_signature: Set(self.responsible_signature.clone()),
            created_at: Set(Utc::now()),
        };

        let responses = RowBatch::<audit_response::Entity, _>::new(
            RESPONSES,
            audit_response::Column::RecordId,
            move |record_id| {
                answers
                    .iter()
                    .map(|answer| audit_response::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        record_id: Set(record_id),
                        item_id: Set(answer.item_id),
                        conforming: Set(answer.conforming),
                        percentage: Set(answer.percentage),
                        notes: Set(answer.notes.clone()),
                    })
                    .collect()
            },
        );

        let outcome = MultiStepWriter::new(db)
            .child(responses)
            .insert(record)
            .await?;

        event_sender
            .send_or_log(Event::AuditRecorded(outcome.parent.id))
            .await;
        info!(
            record_id = %outcome.parent.id,
            responses = outcome.rows(RESPONSES),
            "Audit recorded"
        );
        AUDITS_RECORDED.inc();

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::audit_item::ItemMode;
    use assert_matches::assert_matches;

    fn item(id: Uuid) -> audit_item::Model {
        audit_item::Model {
            id,
            section_id: Uuid::nil(),
            description: "d".into(),
            mode: ItemMode::Conformity,
            percentage: None,
            notes: None,
            position: 1,
        }
    }

    fn command(answers: Vec<AuditAnswer>) -> RecordAuditCommand {
        RecordAuditCommand {
            form_id: Uuid::new_v4(),
            auditor: "Carla".into(),
            unit_id: Uuid::new_v4(),
            audited_on: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            evidence_link: None,
            improvement_suggestion: None,
            responsible_signature: None,
            answers,
        }
    }

    #[test]
    fn unanswered_items_default_to_conforming() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let cmd = command(vec![AuditAnswer {
            item_id: b,
            conforming: false,
            percentage: None,
            notes: Some("dusty".into()),
        }]);

        let answers = cmd.complete_answers(&[item(a), item(b)]).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].item_id, a);
        assert!(answers[0].conforming);
        assert!(!answers[1].conforming);
    }

    #[test]
    fn answers_for_foreign_items_are_rejected() {
        let cmd = command(vec![AuditAnswer {
            item_id: Uuid::new_v4(),
            conforming: true,
            percentage: None,
            notes: None,
        }]);
        assert_matches!(
            cmd.complete_answers(&[item(Uuid::new_v4())]),
            Err(ServiceError::ValidationError(_))
        );
    }
}
