use crate::error::ScrapeError;
use crate::extraction::{lines_from_text, PageContent, PdfExtractor};
use std::io::Write;
use std::process::Command;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` to preserve whitespace alignment of tables.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ScrapeError> {
        check_pdf_header(pdf_bytes)?;

        // Write PDF bytes to a temp file; it is removed when `tmpfile` drops.
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| ScrapeError::Internal(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| ScrapeError::Internal(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ScrapeError::PdftotextNotFound
                } else {
                    ScrapeError::Internal(format!("pdftotext failed to start: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::warn!("pdftotext exited with {code}: {stderr}");
            return Err(ScrapeError::PdftotextFailed { code, stderr });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(split_pages(&text))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Reject input that cannot be a PDF before spawning anything.
fn check_pdf_header(pdf_bytes: &[u8]) -> Result<(), ScrapeError> {
    if pdf_bytes.is_empty() {
        return Err(ScrapeError::ParseFailed("PDF file is empty".into()));
    }
    // The header may be preceded by a little junk; readers accept it within the first KiB.
    let window = &pdf_bytes[..pdf_bytes.len().min(1024)];
    if !window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(ScrapeError::ParseFailed(
            "not a PDF file (missing %PDF- header)".into(),
        ));
    }
    Ok(())
}

/// Split pdftotext output into pages (form feed is the page separator).
fn split_pages(text: &str) -> Vec<PageContent> {
    text.split('\x0c')
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            lines: lines_from_text(page_text)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .filter(|p| p.lines.iter().any(|l| !l.trim().is_empty()) || p.page_number == 1)
        .collect()
}
