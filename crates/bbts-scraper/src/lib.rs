pub mod error;
pub mod extract;
pub mod fetch;
pub mod pagination;
mod parse_helpers;
pub mod selectors;

pub use error::{ExtractError, FetchError};
pub use extract::{Extraction, Field, FieldRule, FieldSource, ListingExtractor, LISTING_FIELDS};
pub use fetch::{
    search_url, BrowserFetcher, BrowserOptions, HttpFetcher, PageFetcher, PageRequest, RawDocument,
};
pub use pagination::{run_pagination, PaginationOutcome, SearchPlan, StopReason};
