use std::fmt::Write;

use tabscrape_core::model::Extraction;
use tabscrape_core::Table;

/// Render every table with at most `preview_rows` data rows each.
pub fn format_extraction(extraction: &Extraction, preview_rows: usize) -> String {
    let mut out = String::new();

    if extraction.tables.is_empty() {
        let _ = writeln!(out, "No tables found in {}", extraction.source);
        return out;
    }

    let _ = writeln!(
        out,
        "Found {} table(s) in {}\n",
        extraction.tables_found, extraction.source
    );
    for table in &extraction.tables {
        out.push_str(&format_table(table, preview_rows));
        out.push('\n');
    }
    out
}

pub fn format_table(table: &Table, preview_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {}  ({} rows x {} cols)",
        table.id, table.title, table.rows, table.cols
    );

    let width = table.max_cols();
    let shown: Vec<&Vec<String>> = table.data.iter().take(preview_rows).collect();

    let mut widths = vec![0usize; width];
    let visible_rows = table.headers.iter().chain(shown.iter().copied());
    for row in visible_rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    if let Some(headers) = &table.headers {
        out.push_str(&format_row(headers, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "  {}", rule.join("-+-"));
    }
    for row in &shown {
        out.push_str(&format_row(row, &widths));
    }

    let hidden = table.data.len().saturating_sub(shown.len());
    if hidden > 0 {
        let _ = writeln!(out, "  ... {hidden} more rows");
    }
    out
}

/// One line, ragged rows padded with blanks up to the widest row.
fn format_row(row: &[String], widths: &[usize]) -> String {
    let cells: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            format!("{cell:<w$}")
        })
        .collect();
    format!("  {}\n", cells.join(" | ").trim_end())
}
