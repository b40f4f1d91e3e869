//! Work instruction archive: uploaded documents with numbered versions and
//! a per-version view log.

use crate::{
    db::DbPool,
    entities::{work_instruction, work_instruction_version},
    errors::ServiceError,
    events::{Event, EventSender},
    storage::ObjectStorage,
};
use bytes::Bytes;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path, sync::Arc};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    delete_row, display_date,
    listing::{ListFilter, Searchable},
};

pub const STORAGE_PREFIX: &str = "work-instructions";

/// The first version is 1.0; each upload adds 0.1 to the latest one.
pub fn next_version(latest: Option<Decimal>) -> Decimal {
    match latest {
        Some(v) => (v + dec!(0.1)).round_dp(1),
        None => dec!(1.0),
    }
}

/// `work-instructions/<millis>-<suffix>.<ext>`, extension lower-cased and
/// `bin` when the upload has none.
pub fn object_path(file_name: &str, suffix: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_string());
    format!(
        "{}/{}-{}.{}",
        STORAGE_PREFIX,
        Utc::now().timestamp_millis(),
        suffix,
        ext
    )
}

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ViewRequest {
    #[validate(length(min = 1, max = 120, message = "Viewer name cannot be empty"))]
    pub viewer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ViewEntry {
    pub viewer: String,
    pub viewed_at: chrono::DateTime<Utc>,
}

/// An instruction with its versions, newest first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkInstructionRow {
    #[serde(flatten)]
    pub instruction: work_instruction::Model,
    pub versions: Vec<work_instruction_version::Model>,
}

impl Searchable for WorkInstructionRow {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.instruction.name.clone(),
            display_date(&self.instruction.created_at),
        ];
        fields.extend(self.versions.iter().map(|v| v.version.to_string()));
        fields
    }
}

#[derive(Clone)]
pub struct WorkInstructionService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    storage: Arc<dyn ObjectStorage>,
}

impl WorkInstructionService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            storage,
        }
    }

    /// Registers a new instruction with its first file as version 1.0.
    #[instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub async fn create(
        &self,
        name: &str,
        upload: Upload,
    ) -> Result<WorkInstructionRow, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Instruction name cannot be empty".to_string(),
            ));
        }

        let instruction = work_instruction::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        let version = self.store_version(instruction.id, None, upload).await?;
        Ok(WorkInstructionRow {
            instruction,
            versions: vec![version],
        })
    }

    /// Uploads a new version, numbered after the latest one.
    #[instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub async fn add_version(
        &self,
        instruction_id: Uuid,
        upload: Upload,
    ) -> Result<work_instruction_version::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        work_instruction::Entity::find_by_id(instruction_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Work instruction", instruction_id))?;

        let latest = work_instruction_version::Entity::find()
            .filter(work_instruction_version::Column::InstructionId.eq(instruction_id))
            .order_by_desc(work_instruction_version::Column::Version)
            .one(db)
            .await?
            .map(|v| v.version);

        self.store_version(instruction_id, latest, upload).await
    }

    async fn store_version(
        &self,
        instruction_id: Uuid,
        latest: Option<Decimal>,
        upload: Upload,
    ) -> Result<work_instruction_version::Model, ServiceError> {
        if upload.bytes.is_empty() {
            return Err(ServiceError::ValidationError("Uploaded file is empty".to_string()));
        }

        let version_id = Uuid::new_v4();
        let suffix = version_id.simple().to_string();
        let path = object_path(&upload.file_name, &suffix[..8]);
        self.storage.upload(&path, upload.bytes).await?;

        let version = work_instruction_version::ActiveModel {
            id: Set(version_id),
            instruction_id: Set(instruction_id),
            version: Set(next_version(latest)),
            file_url: Set(self.storage.public_url(&path)),
            storage_path: Set(path),
            view_log: Set(serde_json::json!([])),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        self.event_sender
            .send_or_log(Event::WorkInstructionVersionUploaded {
                instruction_id,
                version_id,
            })
            .await;
        info!(%instruction_id, version = %version.version, "Work instruction version stored");
        Ok(version)
    }

    /// Appends a viewer to the version's view log.
    #[instrument(skip(self, request))]
    pub async fn record_view(
        &self,
        version_id: Uuid,
        request: ViewRequest,
    ) -> Result<work_instruction_version::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();
        let version = work_instruction_version::Entity::find_by_id(version_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Work instruction version", version_id))?;

        let mut log: Vec<ViewEntry> = serde_json::from_value(version.view_log.clone())
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;
        log.push(ViewEntry {
            viewer: request.viewer.trim().to_string(),
            viewed_at: Utc::now(),
        });
        let log = serde_json::to_value(&log)
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;

        let mut active: work_instruction_version::ActiveModel = version.into();
        active.view_log = Set(log);
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<WorkInstructionRow>, ServiceError> {
        filter.validate_range()?;
        let db = self.db_pool.as_ref();
        let instructions = filter
            .apply_date_range(work_instruction::Entity::find(), work_instruction::Column::CreatedAt)
            .order_by_asc(work_instruction::Column::Name)
            .all(db)
            .await?;

        let mut versions: HashMap<Uuid, Vec<work_instruction_version::Model>> = HashMap::new();
        for version in work_instruction_version::Entity::find()
            .filter(
                work_instruction_version::Column::InstructionId
                    .is_in(instructions.iter().map(|i| i.id)),
            )
            .order_by_desc(work_instruction_version::Column::Version)
            .all(db)
            .await?
        {
            versions.entry(version.instruction_id).or_default().push(version);
        }

        let rows = instructions
            .into_iter()
            .map(|instruction| WorkInstructionRow {
                versions: versions.remove(&instruction.id).unwrap_or_default(),
                instruction,
            })
            .collect();
        Ok(filter.apply_search(rows))
    }

    /// Removes the instruction; its versions follow through the cascade.
    /// Stored files are kept.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        delete_row::<work_instruction::Entity>(
            self.db_pool.as_ref(),
            &self.event_sender,
            "Work instruction",
            id,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_step_by_a_tenth() {
        assert_eq!(next_version(None), dec!(1.0));
        assert_eq!(next_version(Some(dec!(1.0))), dec!(1.1));
        assert_eq!(next_version(Some(dec!(1.9))), dec!(2.0));
    }

    #[test]
    fn object_path_keeps_a_safe_extension() {
        let path = object_path("Manual Final.PDF", "abcd1234");
        assert!(path.starts_with("work-instructions/"));
        assert!(path.ends_with("-abcd1234.pdf"));

        assert!(object_path("noext", "x").ends_with("-x.bin"));
        assert!(object_path("weird.p/df", "x").ends_with(".bin"));
    }
}
