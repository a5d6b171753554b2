use std::path::Path;

use tabscrape_core::config::Config;
use tabscrape_core::error::ScrapeError;
use tabscrape_core::extraction::lines_from_text;
use tabscrape_core::extraction::pdftotext::PdftotextExtractor;
use tabscrape_core::model::{Extraction, SourceKind};
use tabscrape_core::{export_workbook, extract_from_pdf, extract_html_document, Selection};

use crate::fetch;
use crate::output;
use crate::ExtractArgs;

pub fn scrape(url: &str, opts: &ExtractArgs, config: &Config) -> Result<(), ScrapeError> {
    let url = fetch::normalize_url(url)?;
    let html = fetch::fetch_html(&url, &config.fetch)?;
    let extraction = extract_html_document(&html, Some(url.to_string()));
    finish(extraction, opts, config)
}

pub fn html_file(path: &Path, opts: &ExtractArgs, config: &Config) -> Result<(), ScrapeError> {
    let bytes = read_input(path)?;
    let html = String::from_utf8_lossy(&bytes);
    let extraction = extract_html_document(&html, Some(display_name(path)));
    finish(extraction, opts, config)
}

pub fn pdf_file(path: &Path, opts: &ExtractArgs, config: &Config) -> Result<(), ScrapeError> {
    let bytes = read_input(path)?;
    let extractor = PdftotextExtractor::new();
    let mut extraction = extract_from_pdf(&bytes, &extractor, &config.text)?;
    extraction.source = SourceKind::Pdf(Some(display_name(path)));
    finish(extraction, opts, config)
}

pub fn text_file(path: &Path, opts: &ExtractArgs, config: &Config) -> Result<(), ScrapeError> {
    let bytes = read_input(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines = lines_from_text(&text);
    let tables = tabscrape_core::extract_from_text_with(&lines, &config.text);
    let extraction = Extraction::new(SourceKind::Pdf(Some(display_name(path))), tables);
    finish(extraction, opts, config)
}

fn read_input(path: &Path) -> Result<Vec<u8>, ScrapeError> {
    if path.as_os_str().is_empty() {
        return Err(ScrapeError::InvalidInput("no input file given".into()));
    }
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScrapeError::InvalidInput(format!("file not found: {}", path.display()))
        } else {
            ScrapeError::Io(e)
        }
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print the extraction, then export the selection if one was asked for.
fn finish(extraction: Extraction, opts: &ExtractArgs, config: &Config) -> Result<(), ScrapeError> {
    match opts.output.as_str() {
        "json" => output::json::print(&extraction)?,
        _ => print!(
            "{}",
            output::table::format_extraction(&extraction, config.preview.rows)
        ),
    }

    let Some(name) = opts.export.as_deref() else {
        return Ok(());
    };

    let selection = build_selection(&extraction, opts)?;
    let picked = selection.resolve(&extraction.tables);
    let workbook = export_workbook(&picked, name)?;

    std::fs::create_dir_all(&opts.out_dir)?;
    let path = opts.out_dir.join(&workbook.file_name);
    std::fs::write(&path, &workbook.bytes)?;
    eprintln!(
        "Exported {} table(s) to {}",
        workbook.sheet_names.len(),
        path.display()
    );

    Ok(())
}

fn build_selection(extraction: &Extraction, opts: &ExtractArgs) -> Result<Selection, ScrapeError> {
    let mut selection = Selection::new();
    if opts.all {
        selection.select_all(&extraction.tables);
    }
    for &id in &opts.select {
        if extraction.tables.iter().any(|t| t.id == id) {
            selection.select(id);
        } else {
            log::warn!("ignoring unknown table id {id}");
        }
    }

    if selection.is_empty() {
        return Err(ScrapeError::InvalidInput(
            "no tables selected for export (use --select <ID> or --all)".into(),
        ));
    }
    Ok(selection)
}
