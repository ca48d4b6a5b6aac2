use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;
use thiserror::Error;

use super::loader::load_csv;
use super::model::{Cell, Table};

/// Text recorded when no ortholog is found or the match attempt fails.
pub const SENTINEL: &str = "nan";

/// Problems with the reference table itself. These abort one comparison
/// but never the whole run.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("column '{column}' not found in the orthogroups file {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },
}

/// Outcome of looking one identifier up.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// First reference row whose lookup field contains the identifier.
    Found(Cell),
    /// No reference row matched.
    NotFound,
    /// The identifier or a lookup field was not text.
    TypeMismatch,
}

impl Lookup {
    /// The annotation written for this outcome. A matched but empty
    /// ortholog is written as the sentinel too.
    pub fn into_annotation(self) -> Cell {
        match self {
            Lookup::Found(Cell::Null) | Lookup::NotFound | Lookup::TypeMismatch => {
                Cell::String(SENTINEL.to_string())
            }
            Lookup::Found(Cell::String(s)) => Cell::String(s),
            Lookup::Found(other) => Cell::String(other.to_string()),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }
}

// ---------------------------------------------------------------------------
// Orthogroups – the reference mapping
// ---------------------------------------------------------------------------

/// Reference orthogroups table with normalised headers and the two columns
/// the lookup needs resolved up front.
#[derive(Debug, Clone)]
pub struct Orthogroups {
    table: Table,
    lookup_col: usize,
    ortholog_col: usize,
}

impl Orthogroups {
    /// Load the reference CSV, normalise headers (trim + lowercase) and
    /// check both columns exist. Column names are lowercased before the check.
    pub fn load(path: &Path, lookup_column: &str, ortholog_column: &str) -> Result<Self> {
        let table = load_csv(path)?;
        Ok(Self::from_table(table, path, lookup_column, ortholog_column)?)
    }

    pub fn from_table(
        mut table: Table,
        path: &Path,
        lookup_column: &str,
        ortholog_column: &str,
    ) -> Result<Self, ReferenceError> {
        table.normalize_headers();
        debug!("orthogroups columns: {:?}", table.headers);

        let find = |name: &str| {
            let name = name.to_lowercase();
            table
                .column_index(&name)
                .ok_or_else(|| ReferenceError::MissingColumn {
                    column: name,
                    path: path.to_path_buf(),
                })
        };
        let lookup_col = find(lookup_column)?;
        let ortholog_col = find(ortholog_column)?;

        Ok(Orthogroups {
            table,
            lookup_col,
            ortholog_col,
        })
    }

    /// Scan the reference in file order for the first row whose lookup
    /// field contains `id` as a substring.
    ///
    /// Rows with a null lookup field are skipped. If either operand of the
    /// containment test is not text the scan stops with
    /// [`Lookup::TypeMismatch`].
    pub fn find(&self, id: &Cell) -> Lookup {
        for row in &self.table.rows {
            let field = &row[self.lookup_col];
            if field.is_null() {
                continue;
            }
            match (id.as_str(), field.as_str()) {
                (Some(needle), Some(haystack)) => {
                    if haystack.contains(needle) {
                        return Lookup::Found(row[self.ortholog_col].clone());
                    }
                }
                _ => return Lookup::TypeMismatch,
            }
        }
        Lookup::NotFound
    }

    /// Number of reference rows.
    pub fn len(&self) -> usize {
        self.table.len()
    }
}
