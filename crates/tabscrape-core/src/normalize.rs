use crate::model::{default_title, Table};

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_cell_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A cell is numeric when, with `.`, `,` and `-` removed, only ASCII digits
/// remain (and at least one of them).
///
/// "1,234.50" and "2024-01-31" are numeric; "12%", "$5" and "" are not.
pub fn is_numeric_cell(cell: &str) -> bool {
    let mut digits = 0usize;
    for c in cell.chars() {
        match c {
            '.' | ',' | '-' => {}
            '0'..='9' => digits += 1,
            _ => return false,
        }
    }
    digits > 0
}

/// True when the first of several rows contains no numeric cell.
pub fn looks_like_header(rows: &[Vec<String>]) -> bool {
    match rows.first() {
        Some(first) if rows.len() > 1 => first.iter().all(|c| !is_numeric_cell(c)),
        _ => false,
    }
}

/// Split off a header row when [`looks_like_header`] says there is one.
pub fn split_header(mut rows: Vec<Vec<String>>) -> (Option<Vec<String>>, Vec<Vec<String>>) {
    if looks_like_header(&rows) {
        let headers = rows.remove(0);
        (Some(headers), rows)
    } else {
        (None, rows)
    }
}

/// How the rows of a candidate should be turned into a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
    /// Promote the first row to headers when it looks like one.
    Detect,
    /// Keep every row as data.
    None,
}

/// Turn the raw rows of one candidate into a table.
///
/// Returns `None` for candidates with fewer than two rows. `title` falls back
/// to `Table N` derived from `id`.
pub fn build_table(
    id: usize,
    title: Option<String>,
    rows: Vec<Vec<String>>,
    mode: HeaderMode,
) -> Option<Table> {
    if rows.len() < 2 {
        return None;
    }
    let title = title.unwrap_or_else(|| default_title(id));

    match mode {
        HeaderMode::Detect => {
            let original = rows.clone();
            let (headers, data) = split_header(rows);
            let table = Table::new(id, title, data).with_original_data(original);
            Some(match headers {
                Some(h) => table.with_headers(h),
                None => table,
            })
        }
        HeaderMode::None => Some(Table::new(id, title, rows)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_normalize_cell_text() {
        assert_eq!(normalize_cell_text("  New\n   York\tCity "), "New York City");
        assert_eq!(normalize_cell_text(" \n "), "");
    }

    #[test]
    fn test_is_numeric_cell() {
        assert!(is_numeric_cell("30"));
        assert!(is_numeric_cell("1,234.50"));
        assert!(is_numeric_cell("-7"));
        assert!(is_numeric_cell("2024-01-31"));
        assert!(!is_numeric_cell(""));
        assert!(!is_numeric_cell("-"));
        assert!(!is_numeric_cell("12%"));
        assert!(!is_numeric_cell("Age"));
        assert!(!is_numeric_cell("1 000"));
    }

    #[test]
    fn test_header_detected_for_text_row() {
        let (headers, data) = split_header(rows(&[&["Name", "Age"], &["Alice", "30"]]));
        assert_eq!(headers.unwrap(), vec!["Name", "Age"]);
        assert_eq!(data, rows(&[&["Alice", "30"]]));
    }

    #[test]
    fn test_no_header_when_first_row_has_number() {
        let input = rows(&[&["Year", "2023"], &["Sales", "100"]]);
        let (headers, data) = split_header(input.clone());
        assert!(headers.is_none());
        assert_eq!(data, input);
    }

    #[test]
    fn test_single_row_is_never_a_header() {
        assert!(!looks_like_header(&rows(&[&["Name", "Age"]])));
    }

    #[test]
    fn test_build_table_rejects_single_row() {
        assert!(build_table(0, None, rows(&[&["a", "b"]]), HeaderMode::Detect).is_none());
        assert!(build_table(0, None, vec![], HeaderMode::None).is_none());
    }

    #[test]
    fn test_build_table_detect_keeps_original() {
        let t = build_table(
            2,
            None,
            rows(&[&["City", "Pop"], &["Oslo", "709000"], &["Bergen", "291000"]]),
            HeaderMode::Detect,
        )
        .unwrap();
        assert_eq!(t.title, "Table 3");
        assert_eq!(t.rows, 2);
        assert_eq!(t.cols, 2);
        assert_eq!(t.original_data.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_build_table_without_header_mode() {
        let t = build_table(
            0,
            Some("prices".into()),
            rows(&[&["A", "B"], &["C", "D"]]),
            HeaderMode::None,
        )
        .unwrap();
        assert!(t.headers.is_none());
        assert!(t.original_data.is_none());
        assert_eq!(t.rows, 2);
    }
}
