//! Integration tests for the extract -> select -> export pipeline.
//!
//! Uses a MockExtractor that returns pre-built PageContent without
//! invoking pdftotext, so these tests run without poppler-utils.
//! Workbooks are read back with calamine.

use std::io::{Cursor, Read};

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use tabscrape_core::config::TextOptions;
use tabscrape_core::error::{ErrorKind, ScrapeError};
use tabscrape_core::extraction::{lines_from_text, PageContent, PdfExtractor};
use tabscrape_core::{
    export_workbook, extract_from_html, extract_from_pdf, extract_from_text,
    extract_html_document, Selection, Table,
};

struct MockExtractor {
    pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ScrapeError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct BrokenExtractor;

impl PdfExtractor for BrokenExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ScrapeError> {
        Err(ScrapeError::PdftotextFailed {
            code: 1,
            stderr: "Command Line Error: Incorrect password".into(),
        })
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

fn page(number: usize, lines: &[&str]) -> PageContent {
    PageContent {
        page_number: number,
        lines: lines.iter().map(|s| s.to_string()).collect(),
    }
}

fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// Sheet names and cell contents of a workbook, blanks as "".
fn read_workbook(bytes: &[u8]) -> Vec<(String, Vec<Vec<String>>)> {
    let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
    let names = wb.sheet_names().to_vec();
    names
        .into_iter()
        .map(|name| {
            let range = wb.worksheet_range(&name).unwrap();
            let rows = range
                .rows()
                .map(|row| {
                    row.iter()
                        .map(|cell| match cell {
                            Data::String(s) => s.clone(),
                            Data::Empty => String::new(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .collect();
            (name, rows)
        })
        .collect()
}

fn read_part(bytes: &[u8], part: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut file = archive.by_name(part).unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Rates</title><script>document.write("<table><tr><td>x</td></tr></table>")</script></head>
<body>
  <h1>Exchange rates</h1>
  <table id="rates">
    <thead><tr><th>Currency</th><th>Code</th><th>Rate</th></tr></thead>
    <tbody>
      <tr><td>Euro</td><td>EUR</td><td>1.0000</td></tr>
      <tr><td>US dollar</td><td>USD</td><td>1.0842</td></tr>
      <tr><td>Swedish krona</td><td>SEK</td><td>11.2300</td></tr>
    </tbody>
  </table>
  <p>Historic figures</p>
  <table class="history">
    <tr><td>2019</td><td>1.12</td></tr>
    <tr><td>2020</td><td>1.14</td></tr>
  </table>
  <table><tr><td>Footer only</td></tr></table>
</body>
</html>"#;

#[test]
fn html_page_yields_tables_with_matching_dimensions() {
    let tables = extract_from_html(PAGE);
    assert_eq!(tables.len(), 2);

    let rates = &tables[0];
    assert_eq!(rates.id, 0);
    assert_eq!(rates.title, "rates");
    assert_eq!(
        rates.headers.as_deref(),
        Some(&strings(&[&["Currency", "Code", "Rate"]])[0][..])
    );
    assert_eq!(rates.rows, 3);
    assert_eq!(rates.cols, 3);

    let history = &tables[1];
    assert_eq!(history.id, 1);
    assert_eq!(history.title, "history");
    assert!(history.headers.is_none());
    assert_eq!(history.rows, 2);
    assert_eq!(history.cols, 2);
}

#[test]
fn html_scenario_name_age() {
    let html = "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Alice</td><td>30</td></tr></table>";
    let tables = extract_from_html(html);
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].headers, Some(vec!["Name".to_string(), "Age".to_string()]));
    assert_eq!(tables[0].data, strings(&[&["Alice", "30"]]));
    assert_eq!(tables[0].rows, 1);
    assert_eq!(tables[0].cols, 2);
}

#[test]
fn html_extraction_is_idempotent() {
    let first = extract_from_html(PAGE);
    let second = extract_from_html(PAGE);
    assert_eq!(first, second);
}

#[test]
fn html_extraction_json_shape() {
    let extraction = extract_html_document(PAGE, Some("https://example.com/rates".into()));
    let json = serde_json::to_value(&extraction).unwrap();
    assert_eq!(json["tablesFound"], 2);
    assert_eq!(json["source"]["kind"], "html");
    assert_eq!(json["tables"][0]["headers"][2], "Rate");
    assert_eq!(json["tables"][0]["originalData"][0][0], "Currency");
    assert_eq!(json["tables"][1]["data"][0][0], "2019");
}

// ---------------------------------------------------------------------------
// Text / PDF
// ---------------------------------------------------------------------------

#[test]
fn text_scenario_two_rows_then_prose() {
    let lines = lines_from_text("A   B   C\n1   2   3\n\nSome prose line.\n");
    let tables = extract_from_text(&lines);
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].data, strings(&[&["A", "B", "C"], &["1", "2", "3"]]));
    assert!(tables[0].headers.is_none());
}

#[test]
fn pdf_pages_are_flattened_into_one_stream() {
    let extractor = MockExtractor {
        pages: vec![
            page(
                1,
                &[
                    "Annual Report 2023",
                    "",
                    "  Region        Units      Revenue",
                    "  North         1,200      48,000",
                ],
            ),
            page(
                2,
                &[
                    "  South         950        38,000",
                    "",
                    "Notes: figures in EUR.",
                    "Item | Owner | Due",
                    "Audit | Finance | Q1",
                ],
            ),
        ],
    };

    let extraction = extract_from_pdf(b"%PDF-1.4", &extractor, &TextOptions::default()).unwrap();
    assert_eq!(extraction.tables_found, 2);

    let first = &extraction.tables[0];
    assert_eq!(first.rows, 3);
    assert_eq!(first.data[2], vec!["South", "950", "38,000"]);
    assert!(first.headers.is_none());

    let second = &extraction.tables[1];
    assert_eq!(second.id, 1);
    assert_eq!(second.title, "Table 2");
    assert_eq!(second.data[1], vec!["Audit", "Finance", "Q1"]);
}

#[test]
fn pdf_backend_failure_is_parse_failed() {
    let err = extract_from_pdf(b"%PDF-1.4", &BrokenExtractor, &TextOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailed);
}

#[test]
fn pdf_without_tables_is_empty_not_error() {
    let extractor = MockExtractor {
        pages: vec![page(1, &["Dear customer,", "", "thank you for your order."])],
    };
    let extraction = extract_from_pdf(b"%PDF-1.4", &extractor, &TextOptions::default()).unwrap();
    assert_eq!(extraction.tables_found, 0);
}

// ---------------------------------------------------------------------------
// Selection and export
// ---------------------------------------------------------------------------

#[test]
fn selected_tables_export_in_batch_order() {
    let tables = extract_from_html(PAGE);
    let mut selection = Selection::new();
    selection.select(1);
    selection.select(0);

    let picked = selection.resolve(&tables);
    let wb = export_workbook(&picked, "rates export").unwrap();
    assert_eq!(wb.file_name, "rates_export.xlsx");

    let sheets = read_workbook(&wb.bytes);
    assert_eq!(sheets.len(), 2);

    assert_eq!(sheets[0].0, "Table_1");
    assert_eq!(
        sheets[0].1,
        strings(&[
            &["Currency", "Code", "Rate"],
            &["Euro", "EUR", "1.0000"],
            &["US dollar", "USD", "1.0842"],
            &["Swedish krona", "SEK", "11.2300"],
        ])
    );

    assert_eq!(sheets[1].0, "Table_2");
    assert_eq!(sheets[1].1, strings(&[&["2019", "1.12"], &["2020", "1.14"]]));
}

#[test]
fn export_marks_header_row_with_style() {
    let tables = extract_from_html(PAGE);
    let wb = export_workbook(&tables, "styled").unwrap();

    let first = read_part(&wb.bytes, "xl/worksheets/sheet1.xml");
    assert!(first.contains(r#"<c r="A1" s="1" t="s">"#));
    assert!(!first.contains(r#"<c r="A2" s="1""#));

    let second = read_part(&wb.bytes, "xl/worksheets/sheet2.xml");
    assert!(!second.contains(r#"s="1""#));

    let styles = read_part(&wb.bytes, "xl/styles.xml");
    assert!(styles.contains("<b/>"));
    assert!(styles.contains("FFE3F2FD"));
}

#[test]
fn export_pads_ragged_rows() {
    let table = Table::new(
        0,
        "ragged",
        strings(&[&["a", "b", "c"], &["d"], &["e", "f"]]),
    );
    let wb = export_workbook(&[table], "ragged").unwrap();
    let sheets = read_workbook(&wb.bytes);
    assert_eq!(
        sheets[0].1,
        strings(&[&["a", "b", "c"], &["d", "", ""], &["e", "f", ""]])
    );
}

#[test]
fn export_n_tables_gives_n_sheets() {
    let tables: Vec<Table> = (0..5)
        .map(|i| {
            Table::new(
                i,
                format!("Table {}", i + 1),
                vec![
                    vec![format!("r0-{i}"), "x".to_string()],
                    vec![format!("r1-{i}"), "y".to_string()],
                ],
            )
        })
        .collect();
    let wb = export_workbook(&tables, "many").unwrap();
    let sheets = read_workbook(&wb.bytes);
    assert_eq!(sheets.len(), 5);
    for (i, (name, rows)) in sheets.iter().enumerate() {
        assert_eq!(name, &format!("Table_{}", i + 1));
        assert_eq!(rows[0][0], format!("r0-{i}"));
        assert_eq!(rows[1][1], "y");
    }
}

#[test]
fn export_empty_selection_fails() {
    let tables = extract_from_html(PAGE);
    let selection = Selection::new();
    let err = export_workbook(&selection.resolve(&tables), "nothing").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let none: Vec<Table> = Vec::new();
    assert_eq!(
        export_workbook(&none, "x").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
}

#[test]
fn export_drops_characters_xml_cannot_carry() {
    let html = "<table><tr><td>a&#xFFFF;b</td><td>x</td></tr><tr><td>c</td><td>y</td></tr></table>";
    let tables = extract_from_html(html);
    assert_eq!(tables[0].data[0][0], "a\u{FFFF}b");

    let wb = export_workbook(&tables, "clean").unwrap();
    let strings = read_part(&wb.bytes, "xl/sharedStrings.xml");
    assert!(!strings.contains('\u{FFFF}'));
    assert!(strings.contains("<t>ab</t>"));
}
