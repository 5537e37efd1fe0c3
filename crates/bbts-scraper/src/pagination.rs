//! Sequential page-index pagination over the search results.
//!
//! The controller requests one page at a time and stops on the first of:
//!
//! - a page that yields no records (end of results, success),
//! - a fetch failure (records from earlier pages are kept),
//! - `max_pages` fetches (hard bound; a miscounted feed cannot loop forever).
//!
//! There is no retry. A failed page ends the run so a persistent failure is
//! not mistaken for the feed running out of results.

use std::time::Duration;

use bbts_core::{ListingRecord, PaginationStyle};

use crate::error::FetchError;
use crate::extract::ListingExtractor;
use crate::fetch::{PageFetcher, PageRequest};

/// Inputs to one pagination run.
#[derive(Debug, Clone)]
pub struct SearchPlan<'a> {
    pub search_term: &'a str,
    pub page_size: u32,
    /// Maximum number of fetches. `0` performs none.
    pub max_pages: u32,
    pub pagination: PaginationStyle,
    /// Pause between consecutive page requests; not applied before the first.
    pub inter_request_delay_ms: u64,
}

/// Why the controller stopped requesting pages.
#[derive(Debug)]
pub enum StopReason {
    /// `max_pages` fetches were made and every page had records.
    PageLimit,
    /// `page` yielded no records.
    EndOfResults { page: u32 },
    /// `page` could not be fetched.
    FetchFailed { page: u32, error: FetchError },
}

/// Aggregated result of a run. Always carries the records collected before
/// the stop, including when the stop was a fetch failure.
#[derive(Debug)]
pub struct PaginationOutcome {
    pub records: Vec<ListingRecord>,
    /// Pages whose document was fetched successfully.
    pub pages_fetched: u32,
    /// Result items dropped across all pages for missing required fields.
    pub skipped_items: usize,
    pub stop: StopReason,
}

impl PaginationOutcome {
    /// `true` when the run ended on a fetch failure.
    #[must_use]
    pub fn fetch_failed(&self) -> bool {
        matches!(self.stop, StopReason::FetchFailed { .. })
    }
}

/// Drives `fetcher` and `extractor` across result pages per `plan`.
///
/// Never returns an error: fetch failures end the run and are reported in
/// [`PaginationOutcome::stop`] alongside the records already aggregated.
pub async fn run_pagination(
    fetcher: &dyn PageFetcher,
    extractor: &ListingExtractor,
    plan: &SearchPlan<'_>,
) -> PaginationOutcome {
    let first = plan.pagination.first_index();
    let mut records: Vec<ListingRecord> = Vec::new();
    let mut pages_fetched = 0u32;
    let mut skipped_items = 0usize;

    for offset in 0..plan.max_pages {
        let page = first.saturating_add(offset);

        if offset > 0 && plan.inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(plan.inter_request_delay_ms)).await;
        }

        let request = PageRequest {
            page_index: page,
            search_term: plan.search_term,
            page_size: plan.page_size,
        };

        let document = match fetcher.fetch(&request).await {
            Ok(document) => document,
            Err(error) => {
                tracing::error!(
                    page,
                    error = %error,
                    kept_records = records.len(),
                    "failed to fetch page, stopping pagination"
                );
                return PaginationOutcome {
                    records,
                    pages_fetched,
                    skipped_items,
                    stop: StopReason::FetchFailed { page, error },
                };
            }
        };
        pages_fetched += 1;

        let extraction = extractor.extract(&document.html);
        skipped_items += extraction.skipped;

        if extraction.records.is_empty() {
            if extraction.skipped > 0 {
                tracing::warn!(
                    page,
                    skipped = extraction.skipped,
                    "every result item on page was missing a required field"
                );
            }
            tracing::info!(page, "no results on page, end of results");
            return PaginationOutcome {
                records,
                pages_fetched,
                skipped_items,
                stop: StopReason::EndOfResults { page },
            };
        }

        tracing::debug!(
            page,
            results = extraction.records.len(),
            "[PAGE {page}]: Got {} results.",
            extraction.records.len()
        );
        records.extend(extraction.records);
    }

    tracing::info!(max_pages = plan.max_pages, "page limit reached");
    PaginationOutcome {
        records,
        pages_fetched,
        skipped_items,
        stop: StopReason::PageLimit,
    }
}
