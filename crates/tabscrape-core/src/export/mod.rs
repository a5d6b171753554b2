pub mod xlsx;

use std::borrow::Borrow;

use crate::error::ScrapeError;
use crate::model::Table;
use xlsx::{write_workbook, SheetSpec};

/// MIME type of the produced workbook.
pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Longest sheet name Excel accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// A serialized workbook together with the name it should be saved under.
#[derive(Debug, Clone)]
pub struct ExportedWorkbook {
    /// Sanitized file name including the `.xlsx` extension.
    pub file_name: String,
    pub sheet_names: Vec<String>,
    pub bytes: Vec<u8>,
}

impl ExportedWorkbook {
    /// Value for an HTTP `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

/// Write the given tables into a workbook, one sheet per table.
///
/// Tables without data rows get no sheet. Sheets are named after the
/// table's position in `tables` (`Table_1`, `Table_2`, ...), so a skipped
/// table leaves a gap in the numbering.
pub fn export_workbook<T: Borrow<Table>>(
    tables: &[T],
    filename: &str,
) -> Result<ExportedWorkbook, ScrapeError> {
    if filename.trim().is_empty() {
        return Err(ScrapeError::InvalidInput("filename is required".into()));
    }
    if tables.is_empty() {
        return Err(ScrapeError::InvalidInput(
            "no tables selected for export".into(),
        ));
    }

    let sheets: Vec<SheetSpec<'_>> = tables
        .iter()
        .map(<T as Borrow<Table>>::borrow)
        .enumerate()
        .filter(|(_, table)| !table.data.is_empty())
        .map(|(i, table)| SheetSpec {
            name: sheet_name(i),
            headers: table.headers.as_deref().filter(|h| !h.is_empty()),
            rows: &table.data,
        })
        .collect();

    if sheets.is_empty() {
        return Err(ScrapeError::InvalidInput(
            "selected tables contain no data".into(),
        ));
    }

    let bytes = write_workbook(&sheets)?;
    let file_name = format!("{}.xlsx", sanitize_filename(filename));
    log::info!(
        "exported {} sheet(s) to {} ({} bytes)",
        sheets.len(),
        file_name,
        bytes.len()
    );

    Ok(ExportedWorkbook {
        file_name,
        sheet_names: sheets.into_iter().map(|s| s.name).collect(),
        bytes,
    })
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sheet name for the table at 0-based position `index`.
pub fn sheet_name(index: usize) -> String {
    format!("Table_{}", index + 1)
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect()
}
