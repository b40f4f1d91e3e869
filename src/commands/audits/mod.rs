pub mod create_audit_form_command;
pub mod record_audit_command;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    commands::valid_percentage,
    db::{ChildRows, DbPool},
    entities::{
        audit_item::{self, ItemMode},
        audit_section,
    },
};

pub const SECTIONS: &str = "sections";
pub const ITEMS: &str = "items";
pub const RESPONSES: &str = "responses";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_item_mode", skip_on_field_errors = true))]
pub struct AuditItemInput {
    #[validate(length(min = 1, message = "Item description cannot be empty"))]
    pub description: String,
    pub mode: ItemMode,
    #[validate(custom = "valid_percentage")]
    pub percentage: Option<Decimal>,
    pub notes: Option<String>,
}

fn validate_item_mode(item: &AuditItemInput) -> Result<(), ValidationError> {
    if item.mode == ItemMode::Conformity && item.percentage.is_some() {
        return Err(ValidationError::new(
            "conformity items do not take a percentage",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuditSectionInput {
    #[validate(length(min = 1, message = "Section title cannot be empty"))]
    pub title: String,
    #[validate]
    #[serde(default)]
    pub items: Vec<AuditItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_has_sections"))]
pub struct AuditFormInput {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub auditor: Option<String>,
    pub audit_date: Option<NaiveDate>,
    pub unit_id: Option<Uuid>,
    pub evidence_link: Option<String>,
    pub gap_notes: Option<String>,
    pub improvement_notes: Option<String>,
    pub responsible_signature: Option<String>,
    #[validate]
    pub sections: Vec<AuditSectionInput>,
}

fn validate_has_sections(form: &AuditFormInput) -> Result<(), ValidationError> {
    if form.sections.is_empty() {
        return Err(ValidationError::new("a form needs at least one section"));
    }
    Ok(())
}

/// Writes sections one at a time, each followed by its item batch, so
/// items can reference the section id just generated. Positions start at 1.
///
/// The reported count covers section rows only; see [`SectionTree::item_count`].
pub(crate) struct SectionTree {
    pub sections: Vec<AuditSectionInput>,
}

impl SectionTree {
    /// Item rows a successful write inserts.
    pub fn item_count(&self) -> u64 {
        self.sections.iter().map(|s| s.items.len() as u64).sum()
    }
}

#[async_trait]
impl ChildRows for SectionTree {
    fn label(&self) -> &'static str {
        SECTIONS
    }

    async fn write(&self, db: &DbPool, form_id: Uuid) -> Result<u64, DbErr> {
        let mut rows = 0;
        for (index, section) in self.sections.iter().enumerate() {
            let stored = audit_section::ActiveModel {
                id: Set(Uuid::new_v4()),
                form_id: Set(form_id),
                title: Set(section.title.trim().to_string()),
                position: Set(index as i32 + 1),
            }
            .insert(db)
            .await?;
            rows += 1;

            if section.items.is_empty() {
                continue;
            }
            let items = section
                .items
                .iter()
                .enumerate()
                .map(|(position, item)| audit_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    section_id: Set(stored.id),
                    description: Set(item.description.trim().to_string()),
                    mode: Set(item.mode),
                    percentage: Set(match item.mode {
                        ItemMode::Percentage => Some(item.percentage.unwrap_or(Decimal::ZERO)),
                        ItemMode::Conformity => None,
                    }),
                    notes: Set(item.notes.clone()),
                    position: Set(position as i32 + 1),
                });
            let written = audit_item::Entity::insert_many(items)
                .exec_without_returning(db)
                .await?;
            debug!(section_id = %stored.id, items = written, "audit section written");
        }
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) fn sample_form() -> AuditFormInput {
    serde_json::from_value(serde_json::json!({
        "title": "5S Audit",
        "auditor": "Carla",
        "sections": [
            {
                "title": "Sort",
                "items": [
                    { "description": "No unused items on benches", "mode": "Conformity" },
                    { "description": "Labelled shelves", "mode": "Percentage", "percentage": 80 }
                ]
            },
            {
                "title": "Shine",
                "items": [
                    { "description": "Floor is clean", "mode": "Conformity" }
                ]
            }
        ]
    }))
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sample_form_is_valid() {
        assert!(sample_form().validate().is_ok());
    }

    #[test]
    fn section_tree_counts_items_apart_from_sections() {
        let tree = SectionTree {
            sections: sample_form().sections,
        };
        assert_eq!(tree.sections.len(), 2);
        assert_eq!(tree.item_count(), 3);
    }

    #[test]
    fn form_without_sections_is_rejected() {
        let mut form = sample_form();
        form.sections.clear();
        assert!(form.validate().is_err());
    }

    #[test]
    fn nested_item_errors_surface() {
        let mut form = sample_form();
        form.sections[0].items[1].percentage = Some(dec!(120));
        assert!(form.validate().is_err());
    }

    #[test]
    fn conformity_item_with_percentage_is_rejected() {
        let item = AuditItemInput {
            description: "x".into(),
            mode: ItemMode::Conformity,
            percentage: Some(dec!(50)),
            notes: None,
        };
        assert!(item.validate().is_err());
    }
}
