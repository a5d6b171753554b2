pub mod extract;

use std::path::Path;

use tabscrape_core::config::{self, Config};
use tabscrape_core::error::ScrapeError;

pub fn load_config(path: Option<&Path>) -> Result<Config, ScrapeError> {
    match path {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            config::load_config(path)
        }
        None => Ok(Config::default()),
    }
}
