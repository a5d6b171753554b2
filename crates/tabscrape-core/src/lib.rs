pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod model;
pub mod normalize;
pub mod selection;

use config::TextOptions;
use error::ScrapeError;
use extraction::{flatten_pages, PdfExtractor};
use model::{Extraction, SourceKind};

pub use export::{export_workbook, ExportedWorkbook};
pub use extraction::html::extract_from_html;
pub use extraction::text::{extract_from_text, extract_from_text_with};
pub use model::Table;
pub use selection::Selection;

/// Extract tables from a PDF document.
///
/// The backend turns the bytes into text first; if it cannot, the error is
/// returned and no extraction is attempted. Page boundaries are ignored.
pub fn extract_from_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    options: &TextOptions,
) -> Result<Extraction, ScrapeError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    log::debug!(
        "{} returned {} page(s)",
        extractor.backend_name(),
        pages.len()
    );

    let lines = flatten_pages(&pages);
    let tables = extract_from_text_with(&lines, options);
    Ok(Extraction::new(SourceKind::Pdf(None), tables))
}

/// Extract tables from an HTML document held in memory.
///
/// `origin` (URL or file name) is only carried along for display.
pub fn extract_html_document(document: &str, origin: Option<String>) -> Extraction {
    Extraction::new(SourceKind::Html(origin), extract_from_html(document))
}
