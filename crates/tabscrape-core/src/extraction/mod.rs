pub mod html;
pub mod pdftotext;
pub mod text;

use crate::error::ScrapeError;

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ScrapeError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Split a decoded text stream into lines.
///
/// Form feeds (page breaks in pdftotext output) are treated as line breaks.
pub fn lines_from_text(text: &str) -> Vec<&str> {
    text.split(['\n', '\x0c'])
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

/// Flatten pages into one line stream; page boundaries are not kept.
pub fn flatten_pages(pages: &[PageContent]) -> Vec<&str> {
    pages
        .iter()
        .flat_map(|p| p.lines.iter().map(|s| s.as_str()))
        .collect()
}
