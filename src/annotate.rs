use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::{Comparison, ReferenceSettings};
use crate::data::filter::significant;
use crate::data::loader::{list_tables, load_csv};
use crate::data::model::{Cell, Table};
use crate::data::orthogroups::{Lookup, Orthogroups};
use crate::data::writer::write_workbook;

/// Name of the column appended to every annotated table.
pub const ORTHOLOG_COLUMN: &str = "Arabidopsis_orthologs";

/// Preferred identifier column; pandas' name for an unlabeled first column.
pub const ID_COLUMN: &str = "Unnamed: 0";

/// Counts reported after a comparison finishes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub rows_kept: usize,
    pub rows_matched: usize,
}

/// Filter and annotate every table of one comparison and write them to
/// its workbook.
///
/// A reference without the configured columns fails with
/// [`ReferenceError`](crate::data::orthogroups::ReferenceError) before any
/// output is written.
pub fn process_comparison(comparison: &Comparison, reference: &ReferenceSettings) -> Result<Summary> {
    let orthogroups = Orthogroups::load(
        &reference.path,
        &reference.lookup_column,
        &reference.ortholog_column,
    )?;
    debug!("{} orthogroup rows", orthogroups.len());

    let paths = list_tables(&comparison.input_dir)?;
    if paths.is_empty() {
        warn!("no tables found in {}", comparison.input_dir.display());
    }

    let mut summary = Summary::default();
    let mut sheets = Vec::with_capacity(paths.len());

    for path in &paths {
        let table = load_csv(path)?;
        let mut kept = significant(&table).with_context(|| format!("filtering {}", path.display()))?;
        let matched = annotate(&mut kept, &orthogroups)?;
        debug!(
            "{}: {} of {} rows kept, {} matched",
            path.display(),
            kept.len(),
            table.len(),
            matched
        );

        summary.files += 1;
        summary.rows_kept += kept.len();
        summary.rows_matched += matched;

        let sheet_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        sheets.push((sheet_name, kept));
    }

    write_workbook(&comparison.output, &sheets)?;
    info!(
        "{}: {} files, {} significant rows, {} with orthologs → {}",
        comparison.input_dir.display(),
        summary.files,
        summary.rows_kept,
        summary.rows_matched,
        comparison.output.display()
    );
    Ok(summary)
}

/// Append [`ORTHOLOG_COLUMN`] to `table`, one lookup per row in order.
/// Returns how many rows found an ortholog.
pub fn annotate(table: &mut Table, orthogroups: &Orthogroups) -> Result<usize> {
    let id_col = table.column_index(ID_COLUMN).unwrap_or(0);

    let mut matched = 0;
    let annotations: Vec<Cell> = table
        .rows
        .iter()
        .map(|row| {
            let lookup = row
                .get(id_col)
                .map_or(Lookup::TypeMismatch, |id| orthogroups.find(id));
            if lookup.is_found() {
                matched += 1;
            }
            lookup.into_annotation()
        })
        .collect();

    table.push_column(ORTHOLOG_COLUMN, annotations)?;
    Ok(matched)
}
