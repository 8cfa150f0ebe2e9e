//! Embedded in-memory backend.
//!
//! Holds tables as plain value matrices and interprets the statement grammar
//! the builder emits (single-relation SELECT with a conjunctive WHERE, an
//! optional ORDER BY and placeholder-bound LIMIT/OFFSET). Backs the
//! integration tests; not a general SQL engine.

use crate::backend::{Backend, RowStream, SqlArg};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use tabula_core::{ColumnMeta, Error, FilterOp, Result, ScalarKind, Value};
use tracing::debug;

struct MemoryTable {
    columns: Vec<ColumnMeta>,
    rows: Vec<Vec<Value>>,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, MemoryTable>>,
    executed: AtomicUsize,
    introspections: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of count/data statements interpreted so far. Introspection is
    /// not counted.
    pub fn statements_executed(&self) -> usize {
        self.executed.load(AtomicOrdering::Relaxed)
    }

    /// Number of introspection calls served so far.
    pub fn introspections(&self) -> usize {
        self.introspections.load(AtomicOrdering::Relaxed)
    }

    /// Registers a table; `columns` pairs each name with its reported type
    /// name (the strings the decoder's mapping table keys on).
    pub fn create_table(&self, name: &str, columns: &[(&str, &str)]) {
        let table = MemoryTable {
            columns: columns
                .iter()
                .map(|(n, t)| ColumnMeta::new(*n, *t))
                .collect(),
            rows: Vec::new(),
        };
        self.tables.write().insert(name.to_string(), table);
    }

    pub fn insert(&self, table: &str, row: Vec<Value>) -> Result<()> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table)
            .ok_or_else(|| Error::Backend(format!("relation {} does not exist", table)))?;
        if row.len() != table.columns.len() {
            return Err(Error::Backend(format!(
                "row arity {} does not match table arity {}",
                row.len(),
                table.columns.len()
            )));
        }
        table.rows.push(row);
        Ok(())
    }

    fn run(&self, sql: &str, args: &[SqlArg]) -> Result<QueryOutput> {
        debug!(sql, "interpreting statement");
        self.executed.fetch_add(1, AtomicOrdering::Relaxed);
        let stmt = parse_statement(sql)?;
        let tables = self.tables.read();
        let table = tables
            .get(&stmt.table)
            .ok_or_else(|| Error::Backend(format!("relation {} does not exist", stmt.table)))?;

        let mut selected: Vec<&Vec<Value>> = Vec::new();
        for row in &table.rows {
            if row_matches(row, &table.columns, &stmt.predicates, args)? {
                selected.push(row);
            }
        }

        if stmt.count_only {
            return Ok(QueryOutput::Count(selected.len() as i64));
        }

        if let Some((ref key, ascending)) = stmt.order_by {
            let idx = column_index(&table.columns, key)?;
            selected.sort_by(|a, b| match (&a[idx], &b[idx]) {
                (Value::Null, Value::Null) => Ordering::Equal,
                (Value::Null, _) => Ordering::Greater,
                (_, Value::Null) => Ordering::Less,
                (x, y) => {
                    let ord = x.compare(y);
                    if ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                }
            });
        }

        let limit_ph = stmt
            .limit
            .ok_or_else(|| malformed(sql, "data statement missing LIMIT"))?;
        let offset_ph = stmt
            .offset
            .ok_or_else(|| malformed(sql, "data statement missing OFFSET"))?;
        let offset = placeholder_int(args, offset_ph)? as usize;
        let limit = placeholder_int(args, limit_ph)? as usize;
        let window: Vec<&Vec<Value>> = selected.into_iter().skip(offset).take(limit).collect();

        let (columns, rows) = match stmt.projection {
            None => (
                table.columns.clone(),
                window.iter().map(|r| (*r).clone()).collect::<Vec<_>>(),
            ),
            Some(fields) => {
                let indices: Vec<usize> = fields
                    .iter()
                    .map(|f| column_index(&table.columns, f))
                    .collect::<Result<_>>()?;
                let columns = indices
                    .iter()
                    .map(|&i| table.columns[i].clone())
                    .collect();
                let rows = window
                    .iter()
                    .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
                    .collect();
                (columns, rows)
            }
        };

        Ok(QueryOutput::Rows { columns, rows })
    }
}

enum QueryOutput {
    Count(i64),
    Rows {
        columns: Vec<ColumnMeta>,
        rows: Vec<Vec<Value>>,
    },
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn introspect(&self, table: &str) -> Result<Vec<ColumnMeta>> {
        self.introspections.fetch_add(1, AtomicOrdering::Relaxed);
        let tables = self.tables.read();
        tables
            .get(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| Error::Backend(format!("relation {} does not exist", table)))
    }

    async fn fetch_scalar(&self, sql: &str, args: &[SqlArg]) -> Result<i64> {
        match self.run(sql, args)? {
            QueryOutput::Count(n) => Ok(n),
            QueryOutput::Rows { .. } => {
                Err(Error::Backend("statement did not yield a scalar".into()))
            }
        }
    }

    async fn fetch_rows(&self, sql: &str, args: &[SqlArg]) -> Result<Box<dyn RowStream>> {
        match self.run(sql, args)? {
            QueryOutput::Rows { columns, rows } => Ok(Box::new(MemoryRowStream {
                columns,
                rows: rows.into(),
            })),
            QueryOutput::Count(_) => {
                Err(Error::Backend("statement did not yield a cursor".into()))
            }
        }
    }
}

struct MemoryRowStream {
    columns: Vec<ColumnMeta>,
    rows: VecDeque<Vec<Value>>,
}

#[async_trait]
impl RowStream for MemoryRowStream {
    fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    async fn try_next(&mut self, plan: &[ScalarKind]) -> Result<Option<Vec<Value>>> {
        let row = match self.rows.pop_front() {
            Some(row) => row,
            None => return Ok(None),
        };
        if plan.len() != row.len() {
            return Err(Error::Backend(format!(
                "scan plan has {} destinations for {} columns",
                plan.len(),
                row.len()
            )));
        }
        row.iter()
            .zip(plan)
            .map(|(value, kind)| scan_cell(value, *kind))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

fn scan_cell(value: &Value, kind: ScalarKind) -> Result<Value> {
    match (kind, value) {
        // Unmapped reported types scan as null, never as an error.
        (ScalarKind::Opaque, _) => Ok(Value::Null),
        (_, Value::Null) => Ok(Value::Null),
        (ScalarKind::String, Value::String(_)) => Ok(value.clone()),
        (ScalarKind::Int, Value::Int(_)) => Ok(value.clone()),
        (ScalarKind::Float, Value::Float(_)) => Ok(value.clone()),
        (ScalarKind::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
        (ScalarKind::Uuid, Value::Uuid(_)) => Ok(value.clone()),
        (kind, value) => Err(Error::Backend(format!(
            "cannot scan {:?} into {:?}",
            value, kind
        ))),
    }
}

struct Predicate {
    field: String,
    op: FilterOp,
    arg: usize,
}

struct ParsedStatement {
    count_only: bool,
    projection: Option<Vec<String>>,
    table: String,
    predicates: Vec<Predicate>,
    order_by: Option<(String, bool)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

fn parse_statement(sql: &str) -> Result<ParsedStatement> {
    let body = sql
        .strip_prefix("SELECT ")
        .ok_or_else(|| malformed(sql, "expected SELECT"))?;
    let from_idx = body
        .find(" FROM ")
        .ok_or_else(|| malformed(sql, "expected FROM"))?;
    let select_list = &body[..from_idx];
    let mut rest = &body[from_idx + " FROM ".len()..];

    let (count_only, projection) = match select_list {
        "COUNT(*)" => (true, None),
        "*" => (false, None),
        list => {
            let fields = list
                .split(", ")
                .map(unquote)
                .collect::<Result<Vec<_>>>()?;
            (false, Some(fields))
        }
    };

    let (table, after_table) = parse_quoted(rest).map_err(|_| malformed(sql, "expected table"))?;
    rest = after_table;

    let mut predicates = Vec::new();
    if let Some(stripped) = rest.strip_prefix(" WHERE ") {
        let end = stripped
            .find(" ORDER BY ")
            .or_else(|| stripped.find(" LIMIT "))
            .unwrap_or(stripped.len());
        for term in stripped[..end].split(" AND ") {
            predicates.push(parse_predicate(term)?);
        }
        rest = &stripped[end..];
    }

    let mut order_by = None;
    if let Some(stripped) = rest.strip_prefix(" ORDER BY ") {
        let end = stripped.find(" LIMIT ").unwrap_or(stripped.len());
        let clause = &stripped[..end];
        let (field, dir) = parse_quoted(clause)?;
        let ascending = match dir.trim() {
            "ASC" => true,
            "DESC" => false,
            other => return Err(malformed(sql, &format!("bad direction {}", other))),
        };
        order_by = Some((field, ascending));
        rest = &stripped[end..];
    }

    // Count statements carry no pagination clause.
    let (limit, offset) = if rest.is_empty() {
        (None, None)
    } else {
        let stripped = rest
            .strip_prefix(" LIMIT ")
            .ok_or_else(|| malformed(sql, "expected LIMIT"))?;
        let mut parts = stripped.split(" OFFSET ");
        let limit = parse_placeholder(parts.next().unwrap_or_default())?;
        let offset = parse_placeholder(
            parts
                .next()
                .ok_or_else(|| malformed(sql, "expected OFFSET"))?,
        )?;
        (Some(limit), Some(offset))
    };

    Ok(ParsedStatement {
        count_only,
        projection,
        table,
        predicates,
        order_by,
        limit,
        offset,
    })
}

fn parse_predicate(term: &str) -> Result<Predicate> {
    let (field, rest) = parse_quoted(term.trim())?;
    let mut parts = rest.trim().splitn(2, ' ');
    let symbol = parts.next().unwrap_or_default();
    let placeholder = parts.next().unwrap_or_default().trim();
    let op = match symbol {
        "LIKE" => FilterOp::Like,
        "=" => FilterOp::Eq,
        "<>" => FilterOp::Ne,
        "<" => FilterOp::Lt,
        "<=" => FilterOp::Lte,
        ">" => FilterOp::Gt,
        ">=" => FilterOp::Gte,
        other => return Err(malformed(term, &format!("bad operator {}", other))),
    };
    Ok(Predicate {
        field,
        op,
        arg: parse_placeholder(placeholder)?,
    })
}

/// Reads a leading double-quoted identifier, undoing doubled quotes, and
/// returns it with the remaining text.
fn parse_quoted(s: &str) -> Result<(String, &str)> {
    let inner = s
        .strip_prefix('"')
        .ok_or_else(|| malformed(s, "expected quoted identifier"))?;
    let mut name = String::new();
    let mut chars = inner.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '"' {
            if let Some((_, '"')) = chars.peek() {
                name.push('"');
                chars.next();
            } else {
                return Ok((name, &inner[i + 1..]));
            }
        } else {
            name.push(c);
        }
    }
    Err(malformed(s, "unterminated identifier"))
}

fn unquote(s: &str) -> Result<String> {
    let (name, rest) = parse_quoted(s)?;
    if !rest.is_empty() {
        return Err(malformed(s, "trailing text after identifier"));
    }
    Ok(name)
}

fn parse_placeholder(s: &str) -> Result<usize> {
    s.strip_prefix('$')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .ok_or_else(|| malformed(s, "expected placeholder"))
}

fn placeholder_int(args: &[SqlArg], index: usize) -> Result<i64> {
    match args.get(index - 1) {
        Some(SqlArg::Int(n)) if *n >= 0 => Ok(*n),
        other => Err(Error::Backend(format!(
            "placeholder ${} is not a non-negative integer: {:?}",
            index, other
        ))),
    }
}

fn malformed(text: &str, reason: &str) -> Error {
    Error::Backend(format!("malformed statement ({}): {}", reason, text))
}

fn column_index(columns: &[ColumnMeta], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| Error::Backend(format!("column {} does not exist", name)))
}

fn row_matches(
    row: &[Value],
    columns: &[ColumnMeta],
    predicates: &[Predicate],
    args: &[SqlArg],
) -> Result<bool> {
    for pred in predicates {
        let idx = column_index(columns, &pred.field)?;
        let cell = &row[idx];
        let arg = args.get(pred.arg - 1).ok_or_else(|| {
            Error::Backend(format!("missing argument for placeholder ${}", pred.arg))
        })?;
        // SQL comparison semantics: null never matches.
        if cell.is_null() {
            return Ok(false);
        }
        let matched = match pred.op {
            FilterOp::Like => like_matches(cell, arg)?,
            op => match compare_cell(cell, arg) {
                Some(ord) => match op {
                    FilterOp::Eq => ord == Ordering::Equal,
                    FilterOp::Ne => ord != Ordering::Equal,
                    FilterOp::Lt => ord == Ordering::Less,
                    FilterOp::Lte => ord != Ordering::Greater,
                    FilterOp::Gt => ord == Ordering::Greater,
                    FilterOp::Gte => ord != Ordering::Less,
                    FilterOp::Like => unreachable!(),
                },
                None => false,
            },
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Case-sensitive `LIKE` with `%` (any run) and `_` (any one character)
/// wildcards, so patterns carrying interior wildcards behave as they would
/// against a real database.
fn like_matches(cell: &Value, arg: &SqlArg) -> Result<bool> {
    let pattern = match arg {
        SqlArg::Str(s) => s.as_str(),
        other => {
            return Err(Error::Backend(format!(
                "LIKE argument must be a string, got {:?}",
                other
            )))
        }
    };
    Ok(match cell {
        Value::String(s) => {
            let text: Vec<char> = s.chars().collect();
            let pat: Vec<char> = pattern.chars().collect();
            like_match(&text, &pat)
        }
        _ => false,
    })
}

fn like_match(text: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&'%', rest)) => (0..=text.len()).any(|i| like_match(&text[i..], rest)),
        Some((&'_', rest)) => !text.is_empty() && like_match(&text[1..], rest),
        Some((&c, rest)) => text.first() == Some(&c) && like_match(&text[1..], rest),
    }
}

fn compare_cell(cell: &Value, arg: &SqlArg) -> Option<Ordering> {
    match (cell, arg) {
        (Value::Int(a), SqlArg::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), SqlArg::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), SqlArg::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), SqlArg::Float(b)) => a.partial_cmp(b),
        (Value::String(a), SqlArg::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Uuid(a), SqlArg::Str(b)) => Some(a.to_string().cmp(b)),
        _ => None,
    }
}
