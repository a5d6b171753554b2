use std::io::Read;
use std::time::Duration;

use tabscrape_core::config::FetchOptions;
use tabscrape_core::error::ScrapeError;
use url::Url;

/// Pages larger than this are cut off.
const MAX_BODY_BYTES: u64 = 20 * 1024 * 1024;

/// Turn user input into an absolute URL, assuming https when no scheme is given.
pub fn normalize_url(raw: &str) -> Result<Url, ScrapeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ScrapeError::InvalidInput("URL is required".into()));
    }
    let candidate = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate)
        .map_err(|e| ScrapeError::InvalidInput(format!("invalid URL format '{raw}': {e}")))?;
    if url.host_str().is_none() {
        return Err(ScrapeError::InvalidInput(format!(
            "invalid URL format '{raw}': missing host"
        )));
    }
    Ok(url)
}

/// Download a page as text. Bytes that are not UTF-8 are replaced.
pub fn fetch_html(url: &Url, options: &FetchOptions) -> Result<String, ScrapeError> {
    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(options.timeout_secs))
        .redirects(options.max_redirects)
        .user_agent(&options.user_agent)
        .build();

    let fetch_failed = |reason: String| ScrapeError::FetchFailed {
        url: url.to_string(),
        reason,
    };

    log::info!("fetching {url}");
    let response = match agent.get(url.as_str()).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, resp)) => {
            return Err(fetch_failed(format!(
                "server responded {code} {}",
                resp.status_text()
            )));
        }
        Err(err) => return Err(fetch_failed(err.to_string())),
    };

    let body = read_body(response.into_reader(), MAX_BODY_BYTES).map_err(fetch_failed)?;

    log::debug!("received {} bytes from {url}", body.len());
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Read a whole body, failing instead of truncating when it exceeds `limit` bytes.
fn read_body(reader: impl Read, limit: u64) -> Result<Vec<u8>, String> {
    let mut body = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut body)
        .map_err(|e| format!("failed to read response body: {e}"))?;
    if body.len() as u64 > limit {
        return Err(format!("page exceeds {} MiB", limit / (1024 * 1024)));
    }
    Ok(body)
}
