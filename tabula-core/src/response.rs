use crate::error::Error;
use crate::value::DecodedRow;
use serde::{Deserialize, Serialize};

/// Invoker-facing classification of a query outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    InternalError,
}

/// The successful payload of one query: the filtered-but-unpaginated row count
/// and the filtered, sorted, paginated page slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePage {
    pub total: i64,
    pub rows: Vec<DecodedRow>,
}

impl TablePage {
    pub fn empty() -> Self {
        Self {
            total: 0,
            rows: Vec::new(),
        }
    }
}

/// The assembled result handed back to callers.
///
/// On failure `rows` is empty, `total` is zero and `error` carries the
/// classified message; on success `error` is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResult {
    #[serde(rename = "request_id", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: TablePage,
}

impl TableResult {
    pub fn ok(request_id: Option<i64>, page: TablePage) -> Self {
        Self {
            request_id,
            success: true,
            error: None,
            data: page,
        }
    }

    pub fn err(request_id: Option<i64>, err: &Error) -> Self {
        Self {
            request_id,
            success: false,
            error: Some(err.to_string()),
            data: TablePage::empty(),
        }
    }
}
