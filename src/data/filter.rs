use super::model::{Cell, Table, TableError};

/// Column holding the adjusted p-value in DE result tables.
pub const PADJ_COLUMN: &str = "padj";

/// Rows at or above this adjusted p-value are dropped.
pub const PADJ_THRESHOLD: f64 = 0.05;

/// Keep rows whose `column` value is strictly below `threshold`.
///
/// A row passes when:
/// * the cell is numeric and `< threshold` → kept
/// * the cell is `Null` (NaN) → dropped, NaN never compares below
/// * the cell is a string → error, the column is not numeric
pub fn below_threshold(table: &Table, column: &str, threshold: f64) -> Result<Table, TableError> {
    let col = table.require_column(column)?;

    if let Some((row, cell)) = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i, &r[col]))
        .find(|(_, c)| matches!(c, Cell::String(_)))
    {
        return Err(TableError::NonNumeric {
            column: column.to_string(),
            row,
            value: cell.to_string(),
        });
    }

    let mut kept = table.clone();
    kept.retain_rows(|row| row[col].as_f64().is_some_and(|v| v < threshold));
    Ok(kept)
}

/// The fixed significance filter: `padj < 0.05`.
pub fn significant(table: &Table) -> Result<Table, TableError> {
    below_threshold(table, PADJ_COLUMN, PADJ_THRESHOLD)
}
