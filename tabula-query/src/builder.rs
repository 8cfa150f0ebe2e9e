use crate::backend::SqlArg;
use std::fmt::Write;
use tabula_core::{Error, FilterOp, Result, TableRequest, TableSchema};

/// The compiled form of one request: a count statement, a data statement and
/// their positional argument lists. The count statement shares the data
/// statement's filter clause and arguments so `total` reflects the same
/// predicate as the page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatements {
    pub count_sql: String,
    pub data_sql: String,
    pub count_args: Vec<SqlArg>,
    pub data_args: Vec<SqlArg>,
}

/// Quotes an identifier for inclusion in statement text.
///
/// Identifiers still only reach the builder after schema validation; quoting
/// is the second layer, not the justification.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Compiles a validated request against `table` into parameterized statements.
///
/// Every filter value and both pagination bounds travel as `$n` placeholders.
/// The sort column is the one identifier inlined into statement text; that is
/// safe because its membership in the introspected schema was checked, and it
/// replaces the source design that bound the column name as a parameter
/// (which engines treat as ordering by a constant).
pub fn build_statements(
    table: &str,
    schema: &TableSchema,
    req: &TableRequest,
) -> Result<BuiltStatements> {
    let projection = if req.fields.is_empty() {
        "*".to_string()
    } else {
        req.fields
            .iter()
            .map(|f| quote_ident(f))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut filter_clause = String::new();
    let mut count_args = Vec::with_capacity(req.filters.len());
    let mut placeholder = 1;
    for (i, filter) in req.filters.iter().enumerate() {
        let op = FilterOp::parse(&filter.operation)
            .ok_or_else(|| Error::InvalidOperation(filter.operation.clone()))?;
        filter_clause.push_str(if i == 0 { " WHERE " } else { " AND " });
        let _ = write!(
            filter_clause,
            "{} {} ${}",
            quote_ident(&filter.field),
            op.sql_symbol(),
            placeholder
        );
        count_args.push(bind_value(op, &filter.value, &filter.field)?);
        placeholder += 1;
    }

    let count_sql = format!(
        "SELECT COUNT(*) FROM {}{}",
        quote_ident(table),
        filter_clause
    );

    let mut data_sql = format!(
        "SELECT {} FROM {}{}",
        projection,
        quote_ident(table),
        filter_clause
    );
    if !req.sort_by.is_empty() {
        if !schema.contains(&req.sort_by) {
            return Err(Error::UnknownSortField(req.sort_by.clone()));
        }
        let _ = write!(
            data_sql,
            " ORDER BY {} {}",
            quote_ident(&req.sort_by),
            if req.sort_asc { "ASC" } else { "DESC" }
        );
    }
    let _ = write!(data_sql, " LIMIT ${} OFFSET ${}", placeholder, placeholder + 1);

    // Validation only bounds page from below; the product can overflow.
    let offset = (req.page - 1)
        .checked_mul(req.per_page)
        .ok_or(Error::PageOutOfRange(req.page))?;
    let mut data_args = count_args.clone();
    data_args.push(SqlArg::Int(req.per_page));
    data_args.push(SqlArg::Int(offset));

    Ok(BuiltStatements {
        count_sql,
        data_sql,
        count_args,
        data_args,
    })
}

fn bind_value(op: FilterOp, value: &serde_json::Value, field: &str) -> Result<SqlArg> {
    if op == FilterOp::Like {
        // Wrapped in wildcard markers before binding; substring semantics.
        let s = value.as_str().ok_or_else(|| {
            Error::MalformedFilterValue(format!("$like filter on {} requires a string value", field))
        })?;
        return Ok(SqlArg::Str(format!("%{}%", s)));
    }
    match value {
        serde_json::Value::String(s) => Ok(SqlArg::Str(s.clone())),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlArg::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlArg::Float(f))
            } else {
                Err(Error::MalformedFilterValue(format!(
                    "filter on {} has an unrepresentable number",
                    field
                )))
            }
        }
        serde_json::Value::Bool(b) => Ok(SqlArg::Bool(*b)),
        serde_json::Value::Null => Ok(SqlArg::Null),
        _ => Err(Error::MalformedFilterValue(format!(
            "filter on {} must use a scalar value",
            field
        ))),
    }
}
