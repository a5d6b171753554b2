use std::fmt;
use std::path::PathBuf;

/// Caller-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source document could not be retrieved.
    FetchFailed,
    /// The source bytes could not be decoded into text.
    ParseFailed,
    /// The caller supplied nothing usable (no URL, file, selection or filename).
    InvalidInput,
    /// Anything that prevented output for an otherwise readable input.
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FetchFailed => write!(f, "FetchFailed"),
            ErrorKind::ParseFailed => write!(f, "ParseFailed"),
            ErrorKind::InvalidInput => write!(f, "InvalidInput"),
            ErrorKind::InternalError => write!(f, "InternalError"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("failed to read source document: {0}")]
    ParseFailed(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}. The file might be corrupted or password-protected")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("failed to write workbook: {0}")]
    Workbook(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::FetchFailed { .. } => ErrorKind::FetchFailed,
            ScrapeError::ParseFailed(_) | ScrapeError::PdftotextFailed { .. } => {
                ErrorKind::ParseFailed
            }
            ScrapeError::InvalidInput(_) | ScrapeError::ConfigLoad { .. } => {
                ErrorKind::InvalidInput
            }
            ScrapeError::PdftotextNotFound
            | ScrapeError::Workbook(_)
            | ScrapeError::Internal(_)
            | ScrapeError::Io(_)
            | ScrapeError::Json(_) => ErrorKind::InternalError,
        }
    }
}
