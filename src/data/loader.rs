use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::model::{Cell, Table};

/// File-name suffix that marks a table in a comparison directory.
pub const TABLE_EXTENSION: &str = ".csv";

/// Strings `pandas.read_csv` treats as missing by default.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Directory listing
// ---------------------------------------------------------------------------

/// Regular files in `dir` whose name ends in [`TABLE_EXTENSION`], sorted
/// by file name so repeated runs see the same order.
pub fn list_tables(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?;

    let mut tables = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.ends_with(TABLE_EXTENSION) {
            continue;
        }
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            tables.push(entry.path());
        }
    }
    tables.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(tables)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load a comma-delimited file with a header row into a [`Table`].
///
/// Follows the `read_csv` defaults the inputs were written against:
/// * an empty header at position `i` becomes `Unnamed: i`
/// * repeated headers get `.1`, `.2`, … suffixes
/// * [`NA_VALUES`] become [`Cell::Null`]
/// * every column gets a single type (see [`infer_column`])
/// * a first data row with one extra field marks field 0 as a row label,
///   which is dropped; any other overlong row is an error
pub fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;

    let raw_headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("reading CSV headers of {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let headers = mangle_headers(&raw_headers);
    let n_cols = headers.len();

    // Read column-major so each column can be typed as a whole.
    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];
    let mut implicit_index = false;
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{}: CSV row {row_no}", path.display()))?;

        // One field more than the header on the first row: field 0 is a
        // row label (R `write.table` layout) and is not kept.
        if row_no == 0 && n_cols > 0 && record.len() == n_cols + 1 {
            implicit_index = true;
        }
        let skip = usize::from(implicit_index);
        if record.len() > n_cols + skip {
            let line = record
                .position()
                .map_or(row_no as u64 + 2, |p| p.line());
            bail!(
                "{}: line {line}: expected {} fields, saw {}",
                path.display(),
                n_cols + skip,
                record.len()
            );
        }

        for (col_idx, column) in columns.iter_mut().enumerate() {
            let raw = record.get(col_idx + skip).unwrap_or("");
            column.push(if NA_VALUES.contains(&raw) {
                None
            } else {
                Some(raw.to_string())
            });
        }
    }

    let n_rows = columns.first().map_or(0, Vec::len);
    let typed: Vec<Vec<Cell>> = columns.into_iter().map(infer_column).collect();

    let mut rows = vec![Vec::with_capacity(n_cols); n_rows];
    for column in typed {
        for (row, cell) in rows.iter_mut().zip(column) {
            row.push(cell);
        }
    }

    Ok(Table::new(headers, rows))
}

fn mangle_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (i, h) in raw.iter().enumerate() {
        let base = if h.is_empty() {
            format!("Unnamed: {i}")
        } else {
            h.clone()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

/// Pick one type for the whole column: Integer, then Float, then Bool,
/// falling back to String. Missing values stay `Null` whatever the type.
fn infer_column(values: Vec<Option<String>>) -> Vec<Cell> {
    let present = || values.iter().flatten();

    if present().next().is_none() {
        return vec![Cell::Null; values.len()];
    }

    if present().all(|s| s.trim().parse::<i64>().is_ok()) {
        return values
            .iter()
            .map(|v| match v {
                Some(s) => s.trim().parse().map(Cell::Integer).unwrap_or(Cell::Null),
                None => Cell::Null,
            })
            .collect();
    }

    if present().all(|s| s.trim().parse::<f64>().is_ok()) {
        return values
            .iter()
            .map(|v| match v {
                Some(s) => s.trim().parse().map(Cell::Float).unwrap_or(Cell::Null),
                None => Cell::Null,
            })
            .collect();
    }

    if present().all(|s| parse_bool(s).is_some()) {
        return values
            .iter()
            .map(|v| v.as_deref().and_then(parse_bool).map_or(Cell::Null, Cell::Bool))
            .collect();
    }

    values
        .into_iter()
        .map(|v| v.map_or(Cell::Null, Cell::String))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_first_header_becomes_unnamed_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("de.csv");
        fs::write(&path, ",baseMean,padj\ngeneA,10.5,0.01\ngeneB,3,NA\n").unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.headers, vec!["Unnamed: 0", "baseMean", "padj"]);
        assert_eq!(table.rows[0][0], Cell::String("geneA".into()));
        assert_eq!(table.rows[1][1], Cell::Float(3.0));
        assert_eq!(table.rows[1][2], Cell::Null);
    }

    #[test]
    fn columns_are_typed_as_a_whole() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "id,count,flag,mixed\n1,4,True,x\n2,,false,5\n").unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.rows[0][0], Cell::Integer(1));
        assert_eq!(table.rows[1][1], Cell::Null);
        assert_eq!(table.rows[1][2], Cell::Bool(false));
        // one non-numeric value keeps the whole column textual
        assert_eq!(table.rows[1][3], Cell::String("5".into()));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let headers = vec!["a".to_string(), "a".to_string(), "".to_string(), "a".to_string()];
        assert_eq!(mangle_headers(&headers), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn short_rows_are_padded_with_null() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a,b,c\nx,1\n").unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][2], Cell::Null);
    }

    #[test]
    fn leading_row_label_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.csv");
        fs::write(&path, "baseMean,padj\ngeneA123,10,0.01\ngeneB1,4,0.3\n").unwrap();

        let table = load_csv(&path).unwrap();
        assert_eq!(table.headers, vec!["baseMean", "padj"]);
        assert_eq!(table.rows[0], vec![Cell::Integer(10), Cell::Float(0.01)]);
        assert_eq!(table.rows[1], vec![Cell::Integer(4), Cell::Float(0.3)]);
    }

    #[test]
    fn overlong_row_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, ",padj\ngeneA,0.01\ngeneB,0.02,stray\n").unwrap();

        let err = load_csv(&path).unwrap_err().to_string();
        assert!(err.contains("bad.csv"), "{err}");
        assert!(err.contains("line 3"), "{err}");
        assert!(err.contains("expected 2 fields, saw 3"), "{err}");
    }

    #[test]
    fn overlong_first_row_by_two_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, ",padj\ngeneA,0.01,x,y\n").unwrap();
        assert!(load_csv(&path).is_err());
    }

    #[test]
    fn list_tables_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x\n").unwrap();
        fs::write(dir.path().join("a.csv"), "x\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x\n").unwrap();
        fs::write(dir.path().join("upper.CSV"), "x\n").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let names: Vec<String> = list_tables(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(list_tables(&dir.path().join("absent")).is_err());
    }
}
