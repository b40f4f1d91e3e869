// Registries
pub mod audits;
pub mod movements;
pub mod nonconformities;
pub mod returns;
pub mod tco;
pub mod toners;
pub mod units;
pub mod warranties;
pub mod work_instructions;

// Reporting
pub mod charts;
pub mod export;

// Administration
pub mod users;

// Shared list-view filtering
pub mod listing;

use sea_orm::{EntityTrait, PrimaryKeyTrait};
use tracing::info;
use uuid::Uuid;

use crate::{
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Deletes one row by id, reporting a missing row as `NotFound`.
pub(crate) async fn delete_row<E>(
    db: &DbPool,
    event_sender: &EventSender,
    entity: &str,
    id: Uuid,
) -> Result<(), ServiceError>
where
    E: EntityTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let result = E::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::not_found(entity, id));
    }

    event_sender
        .send_or_log(Event::RecordDeleted {
            registry: E::default().table_name().to_string(),
            id,
        })
        .await;
    info!(%id, entity, "Record deleted");
    Ok(())
}

/// `created_at` rendered the way list views display it.
pub(crate) fn display_date(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}
