//! Page fetchers for the storefront search endpoint.
//!
//! Two backends implement [`PageFetcher`]: [`HttpFetcher`] issues a plain GET
//! and returns the server-rendered markup, [`BrowserFetcher`] drives a
//! WebDriver session and returns the DOM after the results have rendered.

mod browser;
mod http;

use async_trait::async_trait;
use bbts_core::PaginationStyle;

use crate::error::FetchError;

pub use browser::{BrowserFetcher, BrowserOptions};
pub use http::HttpFetcher;

/// Parameters identifying one results page.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    /// Page index in the active [`PaginationStyle`]'s numbering.
    pub page_index: u32,
    pub search_term: &'a str,
    pub page_size: u32,
}

/// Markup of one fetched page.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: String,
    pub html: String,
}

/// Retrieves the raw document for one results page.
///
/// Implementations must not retry: a failed page ends the run, and the
/// caller decides what to do with the pages already collected.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<RawDocument, FetchError>;
}

/// Builds the search URL for `request` under the given pagination style.
///
/// - [`PaginationStyle::PageIndex`]: `/Search?PageIndex=i&PageSize=n&SearchText=q`
/// - [`PaginationStyle::Offset`]: `/Search?SearchText=q&PageSize=n&Offset=i*n`
///
/// The search text is form-encoded, so `"iron man"` becomes `iron+man`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base_url` is not an absolute URL.
pub fn search_url(
    base_url: &str,
    style: PaginationStyle,
    request: &PageRequest<'_>,
) -> Result<String, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        base_url: base_url.to_owned(),
        reason,
    };

    let base = reqwest::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    let mut url = base.join("/Search").map_err(|e| invalid(e.to_string()))?;

    match style {
        PaginationStyle::PageIndex => {
            url.query_pairs_mut()
                .append_pair("PageIndex", &request.page_index.to_string())
                .append_pair("PageSize", &request.page_size.to_string())
                .append_pair("SearchText", request.search_term);
        }
        PaginationStyle::Offset => {
            let offset = u64::from(request.page_index) * u64::from(request.page_size);
            url.query_pairs_mut()
                .append_pair("SearchText", request.search_term)
                .append_pair("PageSize", &request.page_size.to_string())
                .append_pair("Offset", &offset.to_string());
        }
    }

    Ok(url.to_string())
}

#[cfg(test)]
#[path = "../fetch_test.rs"]
mod tests;
