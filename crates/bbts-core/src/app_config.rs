use std::path::PathBuf;

use crate::listing::StoreSchema;

/// Which page fetcher drives a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Plain HTTP GET of the search page.
    Http,
    /// A WebDriver-controlled browser that executes the page's scripts.
    Browser,
}

impl Backend {
    /// The store layout produced by this backend. The browser variant also
    /// captures thumbnails, so it persists the `Photo` column.
    #[must_use]
    pub fn schema(self) -> StoreSchema {
        match self {
            Backend::Http => StoreSchema::Standard,
            Backend::Browser => StoreSchema::WithPhoto,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Http => write!(f, "http"),
            Backend::Browser => write!(f, "browser"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Backend::Http),
            "browser" => Ok(Backend::Browser),
            other => Err(format!("unknown backend \"{other}\" (expected http or browser)")),
        }
    }
}

/// How the site encodes the requested page in the search URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `PageIndex=i`, 1-based.
    PageIndex,
    /// `Offset=i * page_size`, 0-based.
    Offset,
}

impl PaginationStyle {
    /// Index of the first page under this convention.
    #[must_use]
    pub fn first_index(self) -> u32 {
        match self {
            PaginationStyle::PageIndex => 1,
            PaginationStyle::Offset => 0,
        }
    }
}

impl std::fmt::Display for PaginationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaginationStyle::PageIndex => write!(f, "page-index"),
            PaginationStyle::Offset => write!(f, "offset"),
        }
    }
}

impl std::str::FromStr for PaginationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page-index" => Ok(PaginationStyle::PageIndex),
            "offset" => Ok(PaginationStyle::Offset),
            other => Err(format!(
                "unknown pagination style \"{other}\" (expected page-index or offset)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub page_size: u32,
    pub page_limit: u32,
    pub debug: bool,
    pub backend: Backend,
    pub pagination: PaginationStyle,
    pub output_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    /// How long the browser backend waits for the results container.
    pub ready_timeout_secs: u64,
    pub user_agent: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub inter_request_delay_ms: u64,
}
