pub mod change_nc_status_command;
pub mod open_non_conformity_command;
pub mod update_non_conformity_command;

use chrono::NaiveDate;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{
    nc_sequence,
    non_conformity::{self, NcKind, Severity},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NonConformityInput {
    #[validate(length(min = 1, message = "Opener cannot be empty"))]
    pub opened_by: String,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    pub kind: NcKind,
    pub severity: Severity,
    #[validate(length(min = 1, message = "Department cannot be empty"))]
    pub department: String,
    #[validate(length(min = 1, message = "Root cause analysis cannot be empty"))]
    pub root_cause: String,
    #[validate(length(min = 1, message = "Immediate action cannot be empty"))]
    pub immediate_action: String,
    #[validate(length(min = 1, message = "Action owner cannot be empty"))]
    pub action_owner: String,
    pub due_date: NaiveDate,
    pub solution_evidence: Option<String>,
}

impl NonConformityInput {
    pub(crate) fn apply(&self, active: &mut non_conformity::ActiveModel) {
        active.opened_by = Set(self.opened_by.trim().to_string());
        active.description = Set(self.description.clone());
        active.kind = Set(self.kind);
        active.severity = Set(self.severity);
        active.department = Set(self.department.clone());
        active.root_cause = Set(self.root_cause.clone());
        active.immediate_action = Set(self.immediate_action.clone());
        active.action_owner = Set(self.action_owner.clone());
        active.due_date = Set(self.due_date);
        active.solution_evidence = Set(non_blank(self.solution_evidence.as_deref()));
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `NC-2024-0007`
pub fn format_nc_number(year: i32, sequence: i32) -> String {
    format!("NC-{}-{:04}", year, sequence)
}

/// Increments the counter for `year` and returns the formatted number.
///
/// Run it inside a transaction: the increment locks the counter row until
/// commit, so concurrent callers get distinct values.
pub async fn allocate_nc_number<C: ConnectionTrait>(db: &C, year: i32) -> Result<String, DbErr> {
    nc_sequence::Entity::insert(nc_sequence::ActiveModel {
        year: Set(year),
        last_value: Set(0),
    })
    .on_conflict(
        OnConflict::column(nc_sequence::Column::Year)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    nc_sequence::Entity::update_many()
        .col_expr(
            nc_sequence::Column::LastValue,
            Expr::col(nc_sequence::Column::LastValue).add(1),
        )
        .filter(nc_sequence::Column::Year.eq(year))
        .exec(db)
        .await?;

    let row = nc_sequence::Entity::find_by_id(year)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("nc sequence for {}", year)))?;

    Ok(format_nc_number(year, row.last_value))
}

/// The number the next allocation for `year` would return. Nothing is reserved.
pub async fn peek_nc_number<C: ConnectionTrait>(db: &C, year: i32) -> Result<String, DbErr> {
    let last = nc_sequence::Entity::find_by_id(year)
        .one(db)
        .await?
        .map(|row| row.last_value)
        .unwrap_or(0);
    Ok(format_nc_number(year, last + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_zero_padded() {
        assert_eq!(format_nc_number(2024, 7), "NC-2024-0007");
        assert_eq!(format_nc_number(2025, 12345), "NC-2025-12345");
    }

    #[test]
    fn blank_evidence_is_dropped() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" photo.jpg ")).as_deref(), Some("photo.jpg"));
    }
}
