use tabula_core::{
    Error, Filter, FilterOp, Result, TableRequest, TableSchema, MAX_PER_PAGE, MIN_PER_PAGE,
};

/// Schema-independent bounds checks. These need no introspection, so the
/// engine runs them before any statement touches the database.
pub fn validate_bounds(req: &TableRequest) -> Result<()> {
    if req.page < 1 {
        return Err(Error::PageOutOfRange(req.page));
    }
    if req.per_page < MIN_PER_PAGE || req.per_page > MAX_PER_PAGE {
        return Err(Error::PerPageOutOfRange(req.per_page));
    }
    Ok(())
}

/// Checks a request against the live schema. Fail-fast: the first violated
/// rule aborts with that specific error, nothing is aggregated. Pure; no side
/// effects.
pub fn validate(schema: &TableSchema, req: &TableRequest) -> Result<()> {
    validate_bounds(req)?;
    for filter in &req.filters {
        if !schema.contains(&filter.field) {
            return Err(Error::UnknownFilterField(filter.field.clone()));
        }
        validate_filter_value(filter)?;
    }
    if !req.sort_by.is_empty() && !schema.contains(&req.sort_by) {
        return Err(Error::UnknownSortField(req.sort_by.clone()));
    }
    if req.fields.len() > schema.len() {
        return Err(Error::ProjectionTooWide {
            requested: req.fields.len(),
            available: schema.len(),
        });
    }
    for field in &req.fields {
        if !schema.contains(field) {
            return Err(Error::UnknownProjectedField(field.clone()));
        }
    }
    Ok(())
}

fn validate_filter_value(filter: &Filter) -> Result<()> {
    let op = FilterOp::parse(&filter.operation).ok_or_else(|| {
        Error::MalformedFilterValue(format!("unrecognized operation: {}", filter.operation))
    })?;
    if filter.value.is_array() || filter.value.is_object() {
        return Err(Error::MalformedFilterValue(format!(
            "filter on {} must use a scalar value",
            filter.field
        )));
    }
    if op == FilterOp::Like && !filter.value.is_string() {
        return Err(Error::MalformedFilterValue(format!(
            "$like filter on {} requires a string value",
            filter.field
        )));
    }
    Ok(())
}
