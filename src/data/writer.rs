use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{
    DocProperties, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
};

use super::model::{Cell, Table};

/// Write each `(sheet name, table)` pair to its own worksheet of a new
/// workbook at `path`. The header row comes first; no index column.
///
/// The workbook's creation time is pinned so identical inputs give
/// identical files.
pub fn write_workbook(path: &Path, sheets: &[(String, Table)]) -> Result<()> {
    let mut workbook = Workbook::new();

    let created = ExcelDateTime::from_ymd(2000, 1, 1).context("building creation date")?;
    let properties = DocProperties::new().set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::Top);

    for (name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .with_context(|| format!("naming sheet '{name}'"))?;
        write_table(worksheet, table, &header_format)
            .with_context(|| format!("writing sheet '{name}'"))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("saving workbook {}", path.display()))?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &Table, header_format: &Format) -> Result<()> {
    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col_num(col)?, header, header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1).context("too many rows for a worksheet")?;
        for (col, cell) in row.iter().enumerate() {
            let col = col_num(col)?;
            match cell {
                Cell::String(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
                Cell::Integer(i) => {
                    worksheet.write_number(row_num, col, *i as f64)?;
                }
                Cell::Float(v) if v.is_finite() => {
                    worksheet.write_number(row_num, col, *v)?;
                }
                Cell::Float(v) if v.is_infinite() => {
                    let text = if *v > 0.0 { "inf" } else { "-inf" };
                    worksheet.write_string(row_num, col, text)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                // Missing values and NaN stay empty.
                Cell::Float(_) | Cell::Null => {}
            }
        }
    }
    Ok(())
}

fn col_num(col: usize) -> Result<u16> {
    u16::try_from(col).context("too many columns for a worksheet")
}
