//! PostgreSQL backend over `sqlx`.
//!
//! Implements the engine's collaborator trait: structural introspection via a
//! prepared zero-row statement, parameterized count/data execution, and
//! per-plan row scanning keyed on the database-reported type names.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Executor, Postgres, Row, Statement, TypeInfo};
use tabula_core::{ColumnMeta, DatabaseConfig, Error, Result, ScalarKind, Value};
use tabula_query::{quote_ident, Backend, RowStream, SqlArg};
use tracing::{debug, info};

pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against the configured instance and verifies connectivity.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string())
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        info!(host = %config.host, dbname = %config.dbname, "connected to postgres");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_arg<'q>(
    query: Query<'q, Postgres, PgArguments>,
    arg: &SqlArg,
) -> Query<'q, Postgres, PgArguments> {
    match arg {
        SqlArg::Str(s) => query.bind(s.clone()),
        SqlArg::Int(i) => query.bind(*i),
        SqlArg::Float(f) => query.bind(*f),
        SqlArg::Bool(b) => query.bind(*b),
        SqlArg::Null => query.bind(Option::<String>::None),
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn introspect(&self, table: &str) -> Result<Vec<ColumnMeta>> {
        // Zero-row structural statement: preparing it is enough to read the
        // column metadata, nothing is executed against the table data.
        let sql = format!("SELECT * FROM {} WHERE false", quote_ident(table));
        debug!(sql, "introspecting");
        let statement = self
            .pool
            .prepare(&sql)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        Ok(statement
            .columns()
            .iter()
            .map(|col| ColumnMeta::new(col.name(), col.type_info().name()))
            .collect())
    }

    async fn fetch_scalar(&self, sql: &str, args: &[SqlArg]) -> Result<i64> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = bind_arg(query, arg);
        }
        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        row.try_get::<i64, _>(0)
            .map_err(|e| Error::Backend(e.to_string()))
    }

    async fn fetch_rows(&self, sql: &str, args: &[SqlArg]) -> Result<Box<dyn RowStream>> {
        // Prepared first so column metadata is available even for an empty
        // result set.
        let statement = self
            .pool
            .prepare(sql)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;
        let columns: Vec<ColumnMeta> = statement
            .columns()
            .iter()
            .map(|col| ColumnMeta::new(col.name(), col.type_info().name()))
            .collect();

        let mut query = statement.query();
        for arg in args {
            query = bind_arg(query, arg);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        Ok(Box::new(PgRowStream {
            columns,
            rows: rows.into_iter(),
        }))
    }
}

struct PgRowStream {
    columns: Vec<ColumnMeta>,
    rows: std::vec::IntoIter<PgRow>,
}

#[async_trait]
impl RowStream for PgRowStream {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    async fn try_next(&mut self, plan: &[ScalarKind]) -> Result<Option<Vec<Value>>> {
        let row = match self.rows.next() {
            Some(row) => row,
            None => return Ok(None),
        };
        plan.iter()
            .enumerate()
            .map(|(i, kind)| scan_column(&row, i, *kind))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        // The result set was fully materialized by fetch_all, so iteration
        // errors have already surfaced; dropping the rows releases them.
        Ok(())
    }
}

fn scan_column(row: &PgRow, index: usize, kind: ScalarKind) -> Result<Value> {
    let scan_err = |e: sqlx::Error| Error::Backend(format!("scan column {}: {}", index, e));
    match kind {
        ScalarKind::Opaque => Ok(Value::Null),
        ScalarKind::String => Ok(row
            .try_get::<Option<String>, _>(index)
            .map_err(scan_err)?
            .map_or(Value::Null, Value::String)),
        ScalarKind::Int => {
            // The driver decodes each integer width strictly; widen to i64.
            if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
                return Ok(v.map_or(Value::Null, Value::Int));
            }
            if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
                return Ok(v.map_or(Value::Null, |n| Value::Int(n.into())));
            }
            Ok(row
                .try_get::<Option<i16>, _>(index)
                .map_err(scan_err)?
                .map_or(Value::Null, |n| Value::Int(n.into())))
        }
        ScalarKind::Uuid => Ok(row
            .try_get::<Option<uuid::Uuid>, _>(index)
            .map_err(scan_err)?
            .map_or(Value::Null, Value::Uuid)),
        ScalarKind::Float => {
            // FLOAT8 decodes directly, FLOAT4 widens; DECIMAL/NUMERIC come
            // through rust_decimal and are narrowed to f64.
            if let Ok(direct) = row.try_get::<Option<f64>, _>(index) {
                return Ok(direct.map_or(Value::Null, Value::Float));
            }
            if let Ok(narrow) = row.try_get::<Option<f32>, _>(index) {
                return Ok(narrow.map_or(Value::Null, |f| Value::Float(f.into())));
            }
            let decimal = row
                .try_get::<Option<Decimal>, _>(index)
                .map_err(scan_err)?;
            match decimal {
                None => Ok(Value::Null),
                Some(d) => d.to_f64().map(Value::Float).ok_or_else(|| {
                    Error::Backend(format!("scan column {}: numeric out of f64 range", index))
                }),
            }
        }
    }
}
