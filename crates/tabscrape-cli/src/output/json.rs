use tabscrape_core::error::ScrapeError;
use tabscrape_core::model::Extraction;

pub fn print(extraction: &Extraction) -> Result<(), ScrapeError> {
    let json = serde_json::to_string_pretty(extraction)?;
    println!("{json}");
    Ok(())
}
