//! Shared list-view filtering: a server-side `created_at` date range, then a
//! case-insensitive substring search over every displayed field.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilter {
    /// Inclusive lower bound on the creation date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date
    pub to: Option<NaiveDate>,
    /// Case-insensitive text matched against every displayed column
    pub search: Option<String>,
}

/// Rows that can be matched by the free-text search.
pub trait Searchable {
    /// Every displayed value, rendered as text.
    fn search_fields(&self) -> Vec<String>;
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

impl ListFilter {
    pub fn validate_range(&self) -> Result<(), ServiceError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(ServiceError::ValidationError(format!(
                "from ({}) must not be after to ({})",
                from, to
            ))),
            _ => Ok(()),
        }
    }

    /// Restricts `query` to rows whose `column` falls within the date range.
    pub fn apply_date_range<E>(&self, mut query: Select<E>, column: E::Column) -> Select<E>
    where
        E: EntityTrait,
    {
        if let Some(from) = self.from {
            query = query.filter(column.gte(start_of(from)));
        }
        if let Some(to) = self.to.and_then(|to| to.checked_add_days(Days::new(1))) {
            query = query.filter(column.lt(start_of(to)));
        }
        query
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches<T: Searchable>(&self, row: &T) -> bool {
        match self.needle() {
            None => true,
            Some(needle) => row
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle)),
        }
    }

    pub fn apply_search<T: Searchable>(&self, rows: Vec<T>) -> Vec<T> {
        if self.needle().is_none() {
            return rows;
        }
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, i32);

    impl Searchable for Row {
        fn search_fields(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let filter = ListFilter {
            search: Some("  hp ".into()),
            ..Default::default()
        };
        let rows = filter.apply_search(vec![Row("HP 85A", 1), Row("Brother", 2)]);
        assert_eq!(rows.len(), 1);

        let by_number = ListFilter {
            search: Some("2".into()),
            ..Default::default()
        };
        assert!(by_number.matches(&Row("Brother", 2)));
    }

    #[test]
    fn blank_search_keeps_everything() {
        let filter = ListFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply_search(vec![Row("a", 1), Row("b", 2)]).len(), 2);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let filter = ListFilter {
            from: NaiveDate::from_ymd_opt(2024, 5, 2),
            to: NaiveDate::from_ymd_opt(2024, 5, 1),
            search: None,
        };
        assert!(filter.validate_range().is_err());
    }
}
