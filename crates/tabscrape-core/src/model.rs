use serde::{Deserialize, Serialize};
use std::fmt;

/// One normalized table found in a source document.
///
/// Rows are not guaranteed to be rectangular; `cols` reflects the width of
/// the first data row only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: usize,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    pub data: Vec<Vec<String>>,
    /// Rows as read from the source, before the header row was split off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data: Option<Vec<Vec<String>>>,
    pub rows: usize,
    pub cols: usize,
}

impl Table {
    /// Build a table, deriving `rows` and `cols` from `data`.
    pub fn new(id: usize, title: impl Into<String>, data: Vec<Vec<String>>) -> Self {
        let rows = data.len();
        let cols = data.first().map(|r| r.len()).unwrap_or(0);
        Table {
            id,
            title: title.into(),
            headers: None,
            data,
            original_data: None,
            rows,
            cols,
        }
    }

    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_original_data(mut self, original: Vec<Vec<String>>) -> Self {
        self.original_data = Some(original);
        self
    }

    /// Width of the widest row, header row included.
    pub fn max_cols(&self) -> usize {
        let header_width = self.headers.as_ref().map(|h| h.len()).unwrap_or(0);
        self.data
            .iter()
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
            .max(header_width)
    }
}

/// Default title for the table at 0-based position `index`.
pub fn default_title(index: usize) -> String {
    format!("Table {}", index + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "origin", rename_all = "lowercase")]
pub enum SourceKind {
    Html(Option<String>),
    Pdf(Option<String>),
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Html(Some(origin)) => write!(f, "HTML ({origin})"),
            SourceKind::Html(None) => write!(f, "HTML"),
            SourceKind::Pdf(Some(origin)) => write!(f, "PDF ({origin})"),
            SourceKind::Pdf(None) => write!(f, "PDF"),
        }
    }
}

/// Result of one extraction pass over a single document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub source: SourceKind,
    pub tables_found: usize,
    pub tables: Vec<Table>,
}

impl Extraction {
    pub fn new(source: SourceKind, tables: Vec<Table>) -> Self {
        Extraction {
            source,
            tables_found: tables.len(),
            tables,
        }
    }
}
