//! Table extraction from HTML markup.
//!
//! The scanner never fails, closes `tr`/`td`/`th`
//! implicitly, and skips comments, doctypes, `<script>` and `<style>` bodies.
//! Each `<table>` element becomes one candidate, nested tables included; rows
//! of an inner table never leak into the table that contains it.

use crate::model::Table;
use crate::normalize::{build_table, normalize_cell_text, HeaderMode};

/// Extract every table from an HTML document, in document order.
pub fn extract_from_html(document: &str) -> Vec<Table> {
    let candidates = collect_candidates(document);

    let mut tables = Vec::new();
    for candidate in candidates {
        let id = tables.len();
        let row_count = candidate.rows.len();
        match build_table(id, candidate.title, candidate.rows, HeaderMode::Detect) {
            Some(table) => tables.push(table),
            None => log::debug!(
                "skipping <table> #{} with {} non-empty row(s)",
                candidate.order,
                row_count
            ),
        }
    }

    tables
}

/// Raw rows of one `<table>` element.
#[derive(Debug)]
struct Candidate {
    order: usize,
    title: Option<String>,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

impl Candidate {
    fn new(order: usize, title: Option<String>) -> Self {
        Candidate {
            order,
            title,
            rows: Vec::new(),
            row: None,
            cell: None,
        }
    }

    fn open_row(&mut self) {
        self.close_row();
        self.row = Some(Vec::new());
    }

    fn open_cell(&mut self) {
        self.close_cell();
        if self.row.is_none() {
            self.row = Some(Vec::new());
        }
        self.cell = Some(String::new());
    }

    fn close_cell(&mut self) {
        if let Some(text) = self.cell.take() {
            if let Some(row) = self.row.as_mut() {
                row.push(normalize_cell_text(&text));
            }
        }
    }

    fn close_row(&mut self) {
        self.close_cell();
        if let Some(row) = self.row.take() {
            if !row.is_empty() {
                self.rows.push(row);
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(cell) = self.cell.as_mut() {
            cell.push_str(text);
        }
    }
}

fn collect_candidates(document: &str) -> Vec<Candidate> {
    let mut open: Vec<Candidate> = Vec::new();
    let mut done: Vec<Candidate> = Vec::new();
    let mut seen = 0;

    for token in Scanner::new(document) {
        match token {
            Token::Start { name, attrs, .. } if name == "table" => {
                let title = table_title(&attrs);
                open.push(Candidate::new(seen, title));
                seen += 1;
            }
            Token::End { name } if name == "table" => {
                if let Some(mut table) = open.pop() {
                    table.close_row();
                    done.push(table);
                }
            }
            Token::Start {
                name, self_closing, ..
            } => {
                let Some(table) = open.last_mut() else {
                    continue;
                };
                match name.as_str() {
                    "tr" => table.open_row(),
                    "td" | "th" => {
                        table.open_cell();
                        if self_closing {
                            table.close_cell();
                        }
                    }
                    "thead" | "tbody" | "tfoot" => table.close_row(),
                    "br" => table.push_text(" "),
                    _ => {}
                }
            }
            Token::End { name } => {
                let Some(table) = open.last_mut() else {
                    continue;
                };
                match name.as_str() {
                    "td" | "th" => table.close_cell(),
                    "tr" | "thead" | "tbody" | "tfoot" => table.close_row(),
                    _ => {}
                }
            }
            Token::Text(text) => {
                if let Some(table) = open.last_mut() {
                    table.push_text(&decode_entities(text));
                }
            }
        }
    }

    // Unclosed tables at end of input.
    while let Some(mut table) = open.pop() {
        table.close_row();
        done.push(table);
    }

    done.sort_by_key(|c| c.order);
    done
}

fn table_title(attrs: &[(String, String)]) -> Option<String> {
    ["id", "class"].iter().find_map(|key| {
        attrs
            .iter()
            .find(|(name, _)| name == key)
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(_, value)| value.clone())
    })
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(&'a str),
}

/// Tolerant tag/text tokenizer over an HTML string.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    /// Move past the next occurrence of `needle`, or to the end of input.
    fn skip_past(&mut self, needle: &str) {
        match self.src[self.pos..].find(needle) {
            Some(i) => self.pos += i + needle.len(),
            None => self.pos = self.src.len(),
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        let bytes = self.bytes();
        while self.pos < bytes.len()
            && (bytes[self.pos].is_ascii_alphanumeric()
                || bytes[self.pos] == b'-'
                || bytes[self.pos] == b':')
        {
            self.pos += 1;
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Parse attributes up to and including the closing `>`.
    fn read_attributes(&mut self) -> (Vec<(String, String)>, bool) {
        let mut attrs = Vec::new();
        let mut self_closing = false;
        let bytes = self.bytes();

        loop {
            self.skip_whitespace();
            if self.pos >= bytes.len() {
                break;
            }
            match bytes[self.pos] {
                b'>' => {
                    self.pos += 1;
                    break;
                }
                b'/' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.pos < bytes.len() && bytes[self.pos] == b'>' {
                        self_closing = true;
                        self.pos += 1;
                        break;
                    }
                    continue;
                }
                _ => {}
            }

            let name_start = self.pos;
            while self.pos < bytes.len()
                && !bytes[self.pos].is_ascii_whitespace()
                && !matches!(bytes[self.pos], b'=' | b'>' | b'/')
            {
                self.pos += 1;
            }
            if self.pos == name_start {
                // Stray '=' or similar; step over it.
                self.pos += 1;
                continue;
            }
            let name = self.src[name_start..self.pos].to_ascii_lowercase();

            self.skip_whitespace();
            let value = if self.pos < bytes.len() && bytes[self.pos] == b'=' {
                self.pos += 1;
                self.skip_whitespace();
                self.read_attribute_value()
            } else {
                String::new()
            };
            attrs.push((name, value));
        }

        (attrs, self_closing)
    }

    fn read_attribute_value(&mut self) -> String {
        let bytes = self.bytes();
        if self.pos >= bytes.len() {
            return String::new();
        }
        let quote = bytes[self.pos];
        let raw = if quote == b'"' || quote == b'\'' {
            self.pos += 1;
            let start = self.pos;
            while self.pos < bytes.len() && bytes[self.pos] != quote {
                self.pos += 1;
            }
            let raw = &self.src[start..self.pos];
            if self.pos < bytes.len() {
                self.pos += 1;
            }
            raw
        } else {
            let start = self.pos;
            while self.pos < bytes.len()
                && !bytes[self.pos].is_ascii_whitespace()
                && bytes[self.pos] != b'>'
            {
                self.pos += 1;
            }
            &self.src[start..self.pos]
        };
        decode_entities(raw)
    }

    /// Jump to the matching end tag of a raw-text element such as `<script>`.
    fn skip_raw_text(&mut self, name: &str) {
        let needle = format!("</{name}");
        match find_ascii_case_insensitive(&self.src[self.pos..], &needle) {
            Some(i) => self.pos += i,
            None => self.pos = self.src.len(),
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            if self.pos >= self.src.len() {
                return None;
            }
            let rest = &self.src[self.pos..];

            if !rest.starts_with('<') {
                let end = rest.find('<').unwrap_or(rest.len());
                self.pos += end;
                return Some(Token::Text(&rest[..end]));
            }

            if rest.starts_with("<!--") {
                self.pos += 4;
                self.skip_past("-->");
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past(">");
                continue;
            }

            let next = rest.as_bytes().get(1).copied();
            if next == Some(b'/') {
                self.pos += 2;
                let name = self.read_name();
                self.skip_past(">");
                if name.is_empty() {
                    continue;
                }
                return Some(Token::End { name });
            }

            if next.is_some_and(|b| b.is_ascii_alphabetic()) {
                self.pos += 1;
                let name = self.read_name();
                let (attrs, self_closing) = self.read_attributes();
                if !self_closing && (name == "script" || name == "style") {
                    self.skip_raw_text(&name);
                }
                return Some(Token::Start {
                    name,
                    attrs,
                    self_closing,
                });
            }

            // A bare '<' is text.
            self.pos += 1;
            return Some(Token::Text(&rest[..1]));
        }
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

/// Longest entity name (between `&` and `;`) that is looked up.
const MAX_ENTITY_LEN: usize = 10;

/// Decode the character references that commonly appear in table markup.
/// Unknown entities are left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .bytes()
            .take(MAX_ENTITY_LEN + 1)
            .position(|b| b == b';')
            .filter(|&semi| semi > 0)
            .and_then(|semi| decode_entity(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "deg" => '\u{b0}',
        "euro" => '\u{20ac}',
        "pound" => '\u{a3}',
        "times" => '\u{d7}',
        _ => return None,
    };
    Some(c)
}
