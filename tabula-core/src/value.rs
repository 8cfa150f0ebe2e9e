use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One decoded result cell.
///
/// Columns whose database-reported type is outside the known mapping decode as
/// `Null` rather than failing the row, so unseen column types pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Uuid(Uuid),
    String(String),
}

/// A single result row: column name to decoded scalar.
pub type DecodedRow = BTreeMap<String, Value>;

/// Target scalar representation chosen for a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Uuid,
    /// Reported type outside the known set; scanned as null, never an error.
    Opaque,
}

impl ScalarKind {
    /// Maps a database-reported type name onto a scalar kind.
    ///
    /// The table is closed: extend it by adding names here, not by inspecting
    /// native driver types at runtime.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name.to_ascii_uppercase().as_str() {
            "UUID" => ScalarKind::Uuid,
            "VARCHAR" | "TEXT" | "CHAR" | "BPCHAR" | "NAME" => ScalarKind::String,
            "INT2" | "INT4" | "INT8" | "INT16" | "INT32" | "INT64" => ScalarKind::Int,
            "DECIMAL" | "NUMERIC" | "FLOAT4" | "FLOAT8" => ScalarKind::Float,
            _ => ScalarKind::Opaque,
        }
    }
}

impl Value {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Value::String(_) => ScalarKind::String,
            Value::Int(_) => ScalarKind::Int,
            Value::Float(_) => ScalarKind::Float,
            Value::Uuid(_) => ScalarKind::Uuid,
            Value::Null => ScalarKind::Opaque,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type-dispatched ordering used by the result sorter.
    ///
    /// Strings compare lexicographically, numbers numerically (ints and floats
    /// coerce against each other), UUIDs by their canonical textual form.
    /// Incomparable pairs are treated as equal; null placement is decided by
    /// the sorter, not here.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Int(a), Value::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Value::Float(a), Value::Int(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (Value::Uuid(a), Value::Uuid(b)) => a.to_string().cmp(&b.to_string()),
            _ => Ordering::Equal,
        }
    }
}
