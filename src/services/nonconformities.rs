use crate::{
    commands::nonconformities::{
        change_nc_status_command::ChangeNcStatusCommand,
        open_non_conformity_command::OpenNonConformityCommand, peek_nc_number,
        update_non_conformity_command::UpdateNonConformityCommand,
    },
    commands::Command,
    db::DbPool,
    entities::non_conformity::{self, CaseStatus, NcKind, Severity},
    errors::ServiceError,
    events::EventSender,
};
use chrono::{Datelike, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::IntoParams;
use uuid::Uuid;

use super::{
    delete_row, display_date,
    listing::{ListFilter, Searchable},
};

impl Searchable for non_conformity::Model {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.number.clone(),
            self.opened_by.clone(),
            self.description.clone(),
            self.kind.to_string(),
            self.severity.to_string(),
            self.department.clone(),
            self.action_owner.clone(),
            self.status.to_string(),
            self.due_date.format("%d/%m/%Y").to_string(),
            display_date(&self.created_at),
        ]
    }
}

/// Exact-match filters offered by the NC list next to the date range and search.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NcFilter {
    pub status: Option<CaseStatus>,
    pub severity: Option<Severity>,
    pub kind: Option<NcKind>,
}

impl NcFilter {
    fn apply(&self, mut query: Select<non_conformity::Entity>) -> Select<non_conformity::Entity> {
        if let Some(status) = self.status {
            query = query.filter(non_conformity::Column::Status.eq(status));
        }
        if let Some(severity) = self.severity {
            query = query.filter(non_conformity::Column::Severity.eq(severity));
        }
        if let Some(kind) = self.kind {
            query = query.filter(non_conformity::Column::Kind.eq(kind));
        }
        query
    }
}

#[derive(Clone)]
pub struct NonConformityService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl NonConformityService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// The number the next opened NC will most likely receive. Nothing is
    /// reserved; the real number is allocated when the NC is saved.
    #[instrument(skip(self))]
    pub async fn next_number(&self) -> Result<String, ServiceError> {
        Ok(peek_nc_number(self.db_pool.as_ref(), Utc::now().year()).await?)
    }

    #[instrument(skip(self, command))]
    pub async fn open(
        &self,
        command: OpenNonConformityCommand,
    ) -> Result<non_conformity::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ListFilter,
        nc_filter: &NcFilter,
    ) -> Result<Vec<non_conformity::Model>, ServiceError> {
        filter.validate_range()?;
        let query = filter
            .apply_date_range(non_conformity::Entity::find(), non_conformity::Column::CreatedAt);
        let rows = nc_filter
            .apply(query)
            .order_by_desc(non_conformity::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<non_conformity::Model, ServiceError> {
        non_conformity::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Non-conformity", id))
    }

    #[instrument(skip(self, command), fields(nc_id = %command.id))]
    pub async fn update(
        &self,
        command: UpdateNonConformityCommand,
    ) -> Result<non_conformity::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self, command), fields(nc_id = %command.id))]
    pub async fn change_status(
        &self,
        command: ChangeNcStatusCommand,
    ) -> Result<non_conformity::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_row::<non_conformity::Entity>(
            self.db_pool.as_ref(),
            &self.event_sender,
            "Non-conformity",
            id,
        )
        .await
    }
}
