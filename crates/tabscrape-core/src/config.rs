use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ScrapeError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const MAX_REDIRECT_LIMIT: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub text: TextOptions,
    pub preview: PreviewOptions,
    pub fetch: FetchOptions,
}

/// Tuning for the plain-text table detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// A delimited line must be longer than this (after trimming) to count as a row.
    pub min_row_chars: usize,
    /// Shorter lines still count when they split into at least this many cells.
    pub short_row_min_cells: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            min_row_chars: 10,
            short_row_min_cells: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    pub rows: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        PreviewOptions { rows: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub max_redirects: u32,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            timeout_secs: 30,
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<Config, ScrapeError> {
    let content = std::fs::read_to_string(path).map_err(|e| ScrapeError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: Config = serde_json::from_str(&content).map_err(|e| ScrapeError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<Config, ScrapeError> {
    let config: Config = serde_json::from_str(json)
        .map_err(|e| ScrapeError::InvalidInput(format!("invalid config: {e}")))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ScrapeError> {
    if config.fetch.timeout_secs == 0 {
        return Err(ScrapeError::InvalidInput(
            "fetch.timeout_secs must be greater than zero".into(),
        ));
    }
    if config.fetch.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(ScrapeError::InvalidInput(format!(
            "fetch.max_redirects must be at most {MAX_REDIRECT_LIMIT}, got {}",
            config.fetch.max_redirects
        )));
    }
    if config.fetch.user_agent.trim().is_empty() {
        return Err(ScrapeError::InvalidInput(
            "fetch.user_agent must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config_str(r#"{ "text": { "min_row_chars": 4 } }"#).unwrap();
        assert_eq!(config.text.min_row_chars, 4);
        assert_eq!(config.text.short_row_min_cells, 3);
        assert_eq!(config.preview.rows, 5);
        assert_eq!(config.fetch.max_redirects, 5);
        assert_eq!(config.fetch.timeout_secs, 30);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(parse_config_str("{}").unwrap(), Config::default());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = parse_config_str(r#"{ "fetch": { "timeout_secs": 0 } }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_rejects_excessive_redirects() {
        let err = parse_config_str(r#"{ "fetch": { "max_redirects": 50 } }"#).unwrap_err();
        assert!(err.to_string().contains("max_redirects"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/tabscrape.json")).unwrap_err();
        assert!(matches!(err, ScrapeError::ConfigLoad { .. }));
    }
}
