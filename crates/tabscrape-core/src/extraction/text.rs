use crate::config::TextOptions;
use crate::model::Table;
use crate::normalize::{build_table, HeaderMode};

/// Detect tables in a flattened text stream (e.g. `pdftotext -layout` output).
///
/// Consecutive aligned lines form one table until a blank line or a prose
/// line breaks the run. No header row is inferred on this path.
pub fn extract_from_text<S: AsRef<str>>(lines: &[S]) -> Vec<Table> {
    extract_from_text_with(lines, &TextOptions::default())
}

pub fn extract_from_text_with<S: AsRef<str>>(lines: &[S], options: &TextOptions) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();
    let mut in_table = false;

    for raw in lines {
        let line = raw.as_ref().trim();

        if is_table_row(line, options) {
            if !in_table {
                in_table = true;
                current.clear();
            }
            let cells = split_cells(line);
            if cells.len() > 1 {
                current.push(cells.into_iter().map(str::to_string).collect());
            }
            continue;
        }

        // Blank line or prose: either one ends the current table.
        if in_table {
            flush(&mut tables, &mut current);
            in_table = false;
        }
    }

    if in_table {
        flush(&mut tables, &mut current);
    }

    tables
}

fn flush(tables: &mut Vec<Table>, rows: &mut Vec<Vec<String>>) {
    let id = tables.len();
    match build_table(id, None, std::mem::take(rows), HeaderMode::None) {
        Some(table) => {
            log::debug!(
                "text table {} closed with {} rows x {} cols",
                id,
                table.rows,
                table.cols
            );
            tables.push(table);
        }
        None => log::debug!("dropping text run with fewer than 2 rows"),
    }
}

/// Whether a trimmed line looks like a table row.
pub fn is_table_row(line: &str, options: &TextOptions) -> bool {
    if !has_separators(line) {
        return false;
    }
    line.chars().count() > options.min_row_chars
        || split_cells(line).len() >= options.short_row_min_cells
}

fn has_separators(line: &str) -> bool {
    line.contains('|') || line.contains('\t') || count_whitespace_gaps(line) >= 2
}

/// Number of runs of two or more consecutive whitespace characters.
fn count_whitespace_gaps(line: &str) -> usize {
    let mut gaps = 0;
    let mut run = 0;
    for c in line.chars() {
        if c.is_whitespace() {
            run += 1;
            if run == 2 {
                gaps += 1;
            }
        } else {
            run = 0;
        }
    }
    gaps
}

/// Split a row into trimmed, non-empty cells.
///
/// Delimiter priority: `|`, then tab, then gaps of 2+ whitespace characters.
pub fn split_cells(line: &str) -> Vec<&str> {
    let cells: Vec<&str> = if line.contains('|') {
        line.split('|').collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else {
        split_by_whitespace_gaps(line)
    };

    cells
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Split a line by gaps of 2+ whitespace characters.
fn split_by_whitespace_gaps(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut gap_start: Option<usize> = None;
    let mut run = 0;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if run == 0 {
                gap_start = Some(i);
            }
            run += 1;
        } else {
            if run >= 2 {
                if let Some(g) = gap_start {
                    segments.push(&line[start..g]);
                    start = i;
                }
            }
            run = 0;
        }
    }

    if run >= 2 {
        if let Some(g) = gap_start {
            segments.push(&line[start..g]);
            return segments;
        }
    }
    segments.push(&line[start..]);
    segments
}
