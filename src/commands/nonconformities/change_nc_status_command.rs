use crate::commands::Command;
use crate::{
    db::DbPool,
    entities::non_conformity::{self, CaseStatus},
    errors::ServiceError,
    events::{Event, EventSender},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::non_blank;

/// Moves a non-conformity through its workflow.
///
/// Closing (`Done`) needs solution evidence, either sent with the request or
/// already stored, and stamps `closed_at` unless the NC was already closed.
/// Any other status clears it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeNcStatusCommand {
    #[serde(skip)]
    pub id: Uuid,
    pub status: CaseStatus,
    pub solution_evidence: Option<String>,
}

fn closing_time(existing: &non_conformity::Model, status: CaseStatus) -> Option<DateTime<Utc>> {
    match status {
        CaseStatus::Done if existing.status == CaseStatus::Done => {
            existing.closed_at.or_else(|| Some(Utc::now()))
        }
        CaseStatus::Done => Some(Utc::now()),
        _ => None,
    }
}

#[async_trait]
impl Command for ChangeNcStatusCommand {
    type Result = non_conformity::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(nc_id = %self.id, status = %self.status))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let db = db_pool.as_ref();

        let existing = non_conformity::Entity::find_by_id(self.id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Non-conformity", self.id))?;

        let evidence = non_blank(self.solution_evidence.as_deref())
            .or_else(|| non_blank(existing.solution_evidence.as_deref()));
        if self.status == CaseStatus::Done && evidence.is_none() {
            return Err(ServiceError::ValidationError(
                "Solution evidence is required to close a non-conformity".to_string(),
            ));
        }

        let old_status = existing.status;
        let closed_at = closing_time(&existing, self.status);
        let mut active: non_conformity::ActiveModel = existing.into();
        active.status = Set(self.status);
        active.solution_evidence = Set(evidence);
        active.closed_at = Set(closed_at);
        let updated = active.update(db).await?;

        if old_status != updated.status {
            event_sender
                .send_or_log(Event::NonConformityStatusChanged {
                    id: updated.id,
                    old_status: old_status.to_string(),
                    new_status: updated.status.to_string(),
                })
                .await;
        }
        info!(number = %updated.number, %old_status, "Non-conformity status changed");

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use crate::entities::non_conformity::{NcKind, Severity};

    fn nc(status: CaseStatus, closed_at: Option<DateTime<Utc>>) -> non_conformity::Model {
        non_conformity::Model {
            id: Uuid::new_v4(),
            number: "NC-2024-0001".into(),
            opened_by: "Ana".into(),
            description: "d".into(),
            kind: NcKind::Product,
            severity: Severity::Low,
            department: "Qualidade".into(),
            root_cause: "r".into(),
            immediate_action: "a".into(),
            action_owner: "Carlos".into(),
            due_date: NaiveDate::from_ymd_opt(2030, 1, 31).unwrap(),
            solution_evidence: Some("e".into()),
            status,
            closed_at,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn closing_again_keeps_the_first_closing_time() {
        let closed = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let existing = nc(CaseStatus::Done, Some(closed));
        assert_eq!(closing_time(&existing, CaseStatus::Done), Some(closed));
    }

    #[test]
    fn closing_stamps_and_reopening_clears() {
        let open = nc(CaseStatus::InProgress, None);
        assert!(closing_time(&open, CaseStatus::Done).is_some());

        let closed = nc(CaseStatus::Done, Some(Utc::now()));
        assert_eq!(closing_time(&closed, CaseStatus::Rejected), None);
    }
}
