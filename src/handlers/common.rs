use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{db::WriteOutcome, services::export::CSV_CONTENT_TYPE};

/// A saved parent record and the number of child rows written per collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct SavedWithRows<T> {
    pub record: T,
    pub rows_written: BTreeMap<String, u64>,
}

impl<T> From<WriteOutcome<T>> for SavedWithRows<T> {
    fn from(outcome: WriteOutcome<T>) -> Self {
        Self {
            rows_written: outcome
                .children
                .iter()
                .map(|(label, n)| (label.to_string(), *n))
                .collect(),
            record: outcome.parent,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Deleted {
    pub id: Uuid,
    /// Dependent rows removed along with the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascaded: Option<u64>,
}

impl Deleted {
    pub fn new(id: Uuid) -> Self {
        Self { id, cascaded: None }
    }

    pub fn with_cascade(id: Uuid, cascaded: u64) -> Self {
        Self {
            id,
            cascaded: Some(cascaded),
        }
    }
}

/// `text/csv` attachment response.
pub fn csv_response(file_name: &str, body: String) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
