use crate::backend::RowStream;
use tabula_core::{ColumnMeta, DecodedRow, Error, Result, ScalarKind};
use tracing::error;

/// Selects a target scalar kind for each result column from its
/// database-reported type name.
pub fn decode_plan(columns: &[ColumnMeta]) -> Vec<ScalarKind> {
    columns
        .iter()
        .map(|col| ScalarKind::from_type_name(&col.type_name))
        .collect()
}

/// Drains a row cursor into decoded rows.
///
/// All-or-nothing per row: one failed column scan aborts the whole fetch with
/// a row-scan error, after closing the cursor. The close and terminal error
/// check run on the success path as well.
pub async fn decode_rows(mut stream: Box<dyn RowStream>) -> Result<Vec<DecodedRow>> {
    let plan = decode_plan(stream.columns());
    let names: Vec<String> = stream
        .columns()
        .iter()
        .map(|col| col.name.clone())
        .collect();

    let mut rows = Vec::new();
    loop {
        match stream.try_next(&plan).await {
            Ok(Some(values)) => {
                let row: DecodedRow = names.iter().cloned().zip(values).collect();
                rows.push(row);
            }
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "row scan failed");
                // Best-effort cleanup of the open cursor before reporting.
                let _ = stream.finish().await;
                return Err(Error::RowScan);
            }
        }
    }

    stream.finish().await.map_err(|e| {
        error!(error = %e, "cursor close failed");
        Error::CursorClose
    })?;

    Ok(rows)
}
