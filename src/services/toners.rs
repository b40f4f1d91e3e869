use crate::{
    calculations::TonerFigures,
    commands::toners::{
        create_toner_command::CreateTonerCommand, delete_toner_command::DeleteTonerCommand,
        update_toner_command::UpdateTonerCommand, TonerInput,
    },
    commands::Command,
    db::DbPool,
    entities::toner,
    errors::ServiceError,
    events::EventSender,
    services::{
        display_date,
        listing::{ListFilter, Searchable},
    },
};
use sea_orm::{EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

impl Searchable for toner::Model {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.model.clone(),
            self.compatible_printers.clone(),
            self.color.to_string(),
            self.kind.to_string(),
            self.gross_weight.to_string(),
            self.empty_weight.to_string(),
            self.net_weight.to_string(),
            self.page_yield.to_string(),
            self.print_coverage.to_string(),
            self.unit_price.to_string(),
            self.price_per_page.to_string(),
            display_date(&self.created_at),
        ]
    }
}

/// Service for the toner catalog
#[derive(Clone)]
pub struct TonerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl TonerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, command))]
    pub async fn create_toner(
        &self,
        command: CreateTonerCommand,
    ) -> Result<toner::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_toners(&self, filter: &ListFilter) -> Result<Vec<toner::Model>, ServiceError> {
        filter.validate_range()?;
        let rows = filter
            .apply_date_range(toner::Entity::find(), toner::Column::CreatedAt)
            .order_by_desc(toner::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(filter.apply_search(rows))
    }

    #[instrument(skip(self))]
    pub async fn get_toner(&self, id: Uuid) -> Result<toner::Model, ServiceError> {
        toner::Entity::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Toner", id))
    }

    #[instrument(skip(self, command), fields(toner_id = %command.id))]
    pub async fn update_toner(
        &self,
        command: UpdateTonerCommand,
    ) -> Result<toner::Model, ServiceError> {
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Deletes the toner and its returned units; returns how many returned
    /// units went with it.
    #[instrument(skip(self))]
    pub async fn delete_toner(&self, id: Uuid) -> Result<u64, ServiceError> {
        DeleteTonerCommand { id }
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Derived figures for a toner being edited, without saving it.
    pub fn preview(&self, input: &TonerInput) -> Result<TonerFigures, ServiceError> {
        input.validate()?;
        Ok(input.figures())
    }
}
