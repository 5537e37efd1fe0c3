use thiserror::Error;

/// Failure to obtain one page's document. Any variant ends pagination.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {waited_secs}s waiting for {url}")]
    Timeout { url: String, waited_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The WebDriver endpoint could not start a session. Raised before the
    /// first page is requested.
    #[error("WebDriver at {webdriver_url} is unavailable: {reason}")]
    DriverUnavailable {
        webdriver_url: String,
        reason: String,
    },

    #[error("WebDriver command failed for {url}: {reason}")]
    Driver { url: String, reason: String },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidUrl { base_url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid CSS selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("field table has no rule for the name field")]
    MissingNameRule,
}
