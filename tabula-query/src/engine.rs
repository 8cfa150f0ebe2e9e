use crate::backend::Backend;
use crate::builder::build_statements;
use crate::decode::decode_rows;
use crate::sort::sort_rows;
use crate::validate::{validate, validate_bounds};
use tabula_core::{
    Error, Result, Status, TablePage, TableRequest, TableResult, TableSchema,
};
use tracing::{debug, error, info};

/// The schema-aware tabular query engine.
///
/// Stateless and reentrant per call: each fetch introspects the schema fresh,
/// compiles and executes its own statements and returns independently. The
/// count query runs strictly before the data query; with no transactional
/// snapshot between them, a write landing in that window can make `total`
/// disagree with the page. That gap is accepted, not hidden.
pub struct Engine<B> {
    backend: B,
}

impl<B: Backend> Engine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs one query: introspect, validate, compile, count, fetch, decode,
    /// sort. Validation errors pass through as-is; backend failures are logged
    /// here and replaced with the classified stage error.
    ///
    /// Pagination bounds are checked first: a request that violates them is
    /// rejected before introspection, so nothing reaches the database.
    pub async fn fetch(&self, table: &str, req: &TableRequest) -> Result<TablePage> {
        validate_bounds(req)?;

        debug!(table, "introspecting schema");
        let columns = self.backend.introspect(table).await.map_err(|e| {
            error!(error = %e, table, "schema introspection failed");
            Error::Introspection
        })?;
        let schema = TableSchema::new(columns);

        validate(&schema, req)?;
        let built = build_statements(table, &schema, req)?;

        debug!(sql = %built.count_sql, "executing count statement");
        let total = self
            .backend
            .fetch_scalar(&built.count_sql, &built.count_args)
            .await
            .map_err(|e| {
                error!(error = %e, table, "count query failed");
                Error::CountQuery
            })?;

        debug!(sql = %built.data_sql, "executing data statement");
        let stream = self
            .backend
            .fetch_rows(&built.data_sql, &built.data_args)
            .await
            .map_err(|e| {
                error!(error = %e, table, "data query failed");
                Error::DataQuery
            })?;

        let mut rows = decode_rows(stream).await?;
        sort_rows(&mut rows, &req.sort_by, req.sort_asc);

        info!(table, total, rows = rows.len(), "query complete");
        Ok(TablePage { total, rows })
    }

    /// The invoker-facing contract: the assembled result plus its status
    /// classification.
    pub async fn fetch_result(&self, table: &str, req: &TableRequest) -> (TableResult, Status) {
        match self.fetch(table, req).await {
            Ok(page) => (TableResult::ok(req.request_id, page), Status::Ok),
            Err(e) => {
                let status = e.status();
                (TableResult::err(req.request_id, &e), status)
            }
        }
    }
}
