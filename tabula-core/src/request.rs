use serde::{Deserialize, Serialize};

/// Smallest page size a caller may request.
pub const MIN_PER_PAGE: i64 = 10;
/// Largest page size a caller may request.
pub const MAX_PER_PAGE: i64 = 100;

/// One conjunctive predicate clause.
///
/// The operation travels as its wire symbol (`$eq`, `$like`, ...) and is parsed
/// into a [`FilterOp`] during validation and again during statement
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operation: String,
    pub value: serde_json::Value,
}

/// The seven recognized filter operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Like,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl FilterOp {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "$like" => Some(FilterOp::Like),
            "$eq" => Some(FilterOp::Eq),
            "$ne" => Some(FilterOp::Ne),
            "$lt" => Some(FilterOp::Lt),
            "$lte" => Some(FilterOp::Lte),
            "$gt" => Some(FilterOp::Gt),
            "$gte" => Some(FilterOp::Gte),
            _ => None,
        }
    }

    /// The SQL comparison text this operation compiles to.
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            FilterOp::Like => "LIKE",
            FilterOp::Eq => "=",
            FilterOp::Ne => "<>",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
        }
    }
}

/// A caller's query against one relation: pagination, conjunctive filters, an
/// optional sort key and a field projection (empty means all columns).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRequest {
    /// Correlation id echoed back in the response.
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
    pub page: i64,
    pub per_page: i64,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sort_by: String,
    #[serde(default)]
    pub sort_asc: bool,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl Default for TableRequest {
    fn default() -> Self {
        Self {
            request_id: None,
            page: 1,
            per_page: MIN_PER_PAGE,
            filters: Vec::new(),
            sort_by: String::new(),
            sort_asc: false,
            fields: Vec::new(),
        }
    }
}
