use async_trait::async_trait;
use tabula_core::{ColumnMeta, Result, ScalarKind, Value};

/// A positional value bound into a parameterized statement. Caller-supplied
/// values only ever reach the database through these; never through statement
/// text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Cursor over the rows of one data query.
///
/// `finish` performs the close and the terminal error check; it must be called
/// on the success path too, not just after failures.
#[async_trait]
pub trait RowStream: Send {
    /// Metadata of the result columns, in projection order.
    fn columns(&self) -> &[ColumnMeta];

    /// Scans the next row into the typed destinations named by `plan`, one
    /// [`ScalarKind`] per result column. Returns `None` once exhausted.
    async fn try_next(&mut self, plan: &[ScalarKind]) -> Result<Option<Vec<Value>>>;

    /// Closes the cursor and surfaces any deferred iteration error.
    async fn finish(self: Box<Self>) -> Result<()>;
}

/// The relational collaborator the engine executes against.
///
/// Implementations report failures as [`tabula_core::Error::Backend`] carrying
/// the driver's text; the engine logs that text and replaces it with the
/// classified stage error before anything reaches a caller.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches the ordered column metadata of `table`, or fails as a whole.
    /// Never returns a partial schema.
    async fn introspect(&self, table: &str) -> Result<Vec<ColumnMeta>>;

    /// Executes a statement expected to yield a single scalar (the count
    /// path).
    async fn fetch_scalar(&self, sql: &str, args: &[SqlArg]) -> Result<i64>;

    /// Executes a statement yielding a row cursor (the data path).
    async fn fetch_rows(&self, sql: &str, args: &[SqlArg]) -> Result<Box<dyn RowStream>>;
}
