use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ScrapeError;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// Longest text Excel keeps in a single cell.
const MAX_CELL_CHARS: usize = 32_767;

/// Cell format index of the bold, shaded header style in `STYLES_XML`.
const HEADER_STYLE: &str = "1";

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font><font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FFE3F2FD"/><bgColor indexed="64"/></patternFill></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// One worksheet to be written.
pub(crate) struct SheetSpec<'a> {
    pub name: String,
    pub headers: Option<&'a [String]>,
    pub rows: &'a [Vec<String>],
}

/// Strings are stored once in `xl/sharedStrings.xml` and referenced by index.
#[derive(Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    strings: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, s: &str) -> usize {
        self.references += 1;
        if let Some(&i) = self.index.get(s) {
            return i;
        }
        let i = self.strings.len();
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), i);
        i
    }
}

/// Serialize sheets into an Office Open XML workbook.
pub(crate) fn write_workbook(sheets: &[SheetSpec<'_>]) -> Result<Vec<u8>, ScrapeError> {
    let mut shared = SharedStrings::default();
    let mut sheet_parts = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        sheet_parts.push(worksheet_xml(sheet, &mut shared)?);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut add = |name: &str, body: &[u8]| -> Result<(), ScrapeError> {
        zip.start_file(name, options).map_err(package_err)?;
        zip.write_all(body)?;
        Ok(())
    };

    add("[Content_Types].xml", &content_types_xml(sheets.len())?)?;
    add("_rels/.rels", ROOT_RELS_XML.as_bytes())?;
    add("xl/workbook.xml", &workbook_xml(sheets)?)?;
    add("xl/_rels/workbook.xml.rels", &workbook_rels_xml(sheets.len())?)?;
    add("xl/styles.xml", STYLES_XML.as_bytes())?;
    add("xl/sharedStrings.xml", &shared_strings_xml(&shared)?)?;
    for (i, part) in sheet_parts.iter().enumerate() {
        add(&format!("xl/worksheets/sheet{}.xml", i + 1), part)?;
    }

    let cursor = zip.finish().map_err(package_err)?;
    Ok(cursor.into_inner())
}

fn worksheet_xml(sheet: &SheetSpec<'_>, shared: &mut SharedStrings) -> Result<Vec<u8>, ScrapeError> {
    let mut w = new_writer()?;

    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", NS_MAIN));
    root.push_attribute(("xmlns:r", NS_REL));
    start(&mut w, root)?;

    let header_rows = usize::from(sheet.headers.is_some());
    let total_rows = header_rows + sheet.rows.len();
    let width = sheet
        .rows
        .iter()
        .map(|r| r.len())
        .chain(sheet.headers.map(|h| h.len()))
        .max()
        .unwrap_or(0);
    let dimension = if total_rows == 0 || width == 0 {
        "A1".to_string()
    } else {
        format!("A1:{}", cell_ref(total_rows - 1, width - 1))
    };
    let mut dim = BytesStart::new("dimension");
    dim.push_attribute(("ref", dimension.as_str()));
    empty(&mut w, dim)?;

    let mut view = BytesStart::new("sheetView");
    view.push_attribute(("workbookViewId", "0"));
    start(&mut w, BytesStart::new("sheetViews"))?;
    if sheet.headers.is_some() {
        start(&mut w, view)?;
        let mut pane = BytesStart::new("pane");
        pane.push_attribute(("ySplit", "1"));
        pane.push_attribute(("topLeftCell", "A2"));
        pane.push_attribute(("activePane", "bottomLeft"));
        pane.push_attribute(("state", "frozen"));
        empty(&mut w, pane)?;
        end(&mut w, "sheetView")?;
    } else {
        empty(&mut w, view)?;
    }
    end(&mut w, "sheetViews")?;

    start(&mut w, BytesStart::new("sheetData"))?;
    if let Some(headers) = sheet.headers {
        write_row(&mut w, 0, headers, Some(HEADER_STYLE), shared)?;
    }
    for (i, row) in sheet.rows.iter().enumerate() {
        write_row(&mut w, header_rows + i, row, None, shared)?;
    }
    end(&mut w, "sheetData")?;

    end(&mut w, "worksheet")?;
    Ok(w.into_inner())
}

fn write_row(
    w: &mut Writer<Vec<u8>>,
    row_index: usize,
    cells: &[String],
    style: Option<&str>,
    shared: &mut SharedStrings,
) -> Result<(), ScrapeError> {
    let r = (row_index + 1).to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", r.as_str()));
    start(w, row)?;

    for (col, value) in cells.iter().enumerate() {
        let reference = cell_ref(row_index, col);
        let mut cell = BytesStart::new("c");
        cell.push_attribute(("r", reference.as_str()));
        if let Some(s) = style {
            cell.push_attribute(("s", s));
        }
        if value.is_empty() {
            // Blank cells are omitted unless they carry a style.
            if style.is_some() {
                empty(w, cell)?;
            }
            continue;
        }
        cell.push_attribute(("t", "s"));
        start(w, cell)?;
        start(w, BytesStart::new("v"))?;
        let value = clamp_cell_text(value, &reference);
        text(w, &shared.intern(value).to_string())?;
        end(w, "v")?;
        end(w, "c")?;
    }

    end(w, "row")
}

fn workbook_xml(sheets: &[SheetSpec<'_>]) -> Result<Vec<u8>, ScrapeError> {
    let mut w = new_writer()?;
    let mut root = BytesStart::new("workbook");
    root.push_attribute(("xmlns", NS_MAIN));
    root.push_attribute(("xmlns:r", NS_REL));
    start(&mut w, root)?;
    start(&mut w, BytesStart::new("sheets"))?;
    for (i, sheet) in sheets.iter().enumerate() {
        let sheet_id = (i + 1).to_string();
        let rel_id = format!("rId{}", i + 1);
        let mut el = BytesStart::new("sheet");
        el.push_attribute(("name", sheet.name.as_str()));
        el.push_attribute(("sheetId", sheet_id.as_str()));
        el.push_attribute(("r:id", rel_id.as_str()));
        empty(&mut w, el)?;
    }
    end(&mut w, "sheets")?;
    end(&mut w, "workbook")?;
    Ok(w.into_inner())
}

fn workbook_rels_xml(sheet_count: usize) -> Result<Vec<u8>, ScrapeError> {
    let mut w = new_writer()?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/relationships",
    ));
    start(&mut w, root)?;

    let mut relationship = |id: usize, kind: &str, target: &str| -> Result<(), ScrapeError> {
        let id = format!("rId{id}");
        let mut el = BytesStart::new("Relationship");
        el.push_attribute(("Id", id.as_str()));
        el.push_attribute(("Type", kind));
        el.push_attribute(("Target", target));
        empty(&mut w, el)
    };

    for i in 1..=sheet_count {
        relationship(i, REL_WORKSHEET, &format!("worksheets/sheet{i}.xml"))?;
    }
    relationship(
        sheet_count + 1,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles",
        "styles.xml",
    )?;
    relationship(
        sheet_count + 2,
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings",
        "sharedStrings.xml",
    )?;

    end(&mut w, "Relationships")?;
    Ok(w.into_inner())
}

fn content_types_xml(sheet_count: usize) -> Result<Vec<u8>, ScrapeError> {
    let mut w = new_writer()?;
    let mut root = BytesStart::new("Types");
    root.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/content-types",
    ));
    start(&mut w, root)?;

    for (ext, kind) in [
        ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
        ("xml", "application/xml"),
    ] {
        let mut el = BytesStart::new("Default");
        el.push_attribute(("Extension", ext));
        el.push_attribute(("ContentType", kind));
        empty(&mut w, el)?;
    }

    let mut overrides = vec![
        ("/xl/workbook.xml".to_string(), CT_WORKBOOK),
        (
            "/xl/styles.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
        ),
        (
            "/xl/sharedStrings.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml",
        ),
    ];
    for i in 1..=sheet_count {
        overrides.push((format!("/xl/worksheets/sheet{i}.xml"), CT_WORKSHEET));
    }
    for (part, kind) in &overrides {
        let mut el = BytesStart::new("Override");
        el.push_attribute(("PartName", part.as_str()));
        el.push_attribute(("ContentType", *kind));
        empty(&mut w, el)?;
    }

    end(&mut w, "Types")?;
    Ok(w.into_inner())
}

fn shared_strings_xml(shared: &SharedStrings) -> Result<Vec<u8>, ScrapeError> {
    let mut w = new_writer()?;
    let count = shared.references.to_string();
    let unique = shared.strings.len().to_string();
    let mut root = BytesStart::new("sst");
    root.push_attribute(("xmlns", NS_MAIN));
    root.push_attribute(("count", count.as_str()));
    root.push_attribute(("uniqueCount", unique.as_str()));
    start(&mut w, root)?;

    for s in &shared.strings {
        start(&mut w, BytesStart::new("si"))?;
        let mut t = BytesStart::new("t");
        if s.trim() != s.as_str() {
            t.push_attribute(("xml:space", "preserve"));
        }
        start(&mut w, t)?;
        text(&mut w, &xml_safe(s))?;
        end(&mut w, "t")?;
        end(&mut w, "si")?;
    }

    end(&mut w, "sst")?;
    Ok(w.into_inner())
}

/// A1-style reference for a 0-based row and column.
pub(crate) fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_name(col), row + 1)
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
pub(crate) fn column_name(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Truncate text that would not fit in one cell.
fn clamp_cell_text<'a>(value: &'a str, reference: &str) -> &'a str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            log::warn!("cell {reference} truncated to {MAX_CELL_CHARS} characters");
            &value[..cut]
        }
        None => value,
    }
}

/// Drop characters outside the XML 1.0 `Char` production.
fn xml_safe(s: &str) -> Cow<'_, str> {
    let invalid = |c: char| {
        (c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')) || matches!(c, '\u{FFFE}' | '\u{FFFF}')
    };
    if s.chars().any(invalid) {
        Cow::Owned(s.chars().filter(|&c| !invalid(c)).collect())
    } else {
        Cow::Borrowed(s)
    }
}

fn new_writer() -> Result<Writer<Vec<u8>>, ScrapeError> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;
    Ok(w)
}

fn start(w: &mut Writer<Vec<u8>>, el: BytesStart<'_>) -> Result<(), ScrapeError> {
    w.write_event(Event::Start(el)).map_err(xml_err)
}

fn empty(w: &mut Writer<Vec<u8>>, el: BytesStart<'_>) -> Result<(), ScrapeError> {
    w.write_event(Event::Empty(el)).map_err(xml_err)
}

fn end(w: &mut Writer<Vec<u8>>, name: &str) -> Result<(), ScrapeError> {
    w.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)
}

fn text(w: &mut Writer<Vec<u8>>, content: &str) -> Result<(), ScrapeError> {
    w.write_event(Event::Text(BytesText::new(content)))
        .map_err(xml_err)
}

fn xml_err(e: impl Display) -> ScrapeError {
    ScrapeError::Workbook(format!("XML error: {e}"))
}

fn package_err(e: impl Display) -> ScrapeError {
    ScrapeError::Workbook(format!("ZIP error: {e}"))
}
