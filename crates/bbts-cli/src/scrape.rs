//! One scrape run: fetch result pages, extract listings, merge into the store.
//!
//! Called from `main` once config and logging are set up. A page fetch
//! failure is not an error here; pagination stops, the records collected so
//! far are still merged, and the failure is carried in the report.

use anyhow::Context;
use bbts_core::{AppConfig, Backend};
use bbts_scraper::{
    run_pagination, BrowserFetcher, BrowserOptions, HttpFetcher, ListingExtractor,
    PaginationOutcome, SearchPlan, StopReason,
};
use bbts_store::{merge_into_store, MergeOutcome};

/// How a run changed the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunStatus {
    /// The store did not exist and was created.
    Created,
    /// New rows were appended.
    Updated,
    /// Nothing was written.
    Unchanged,
}

impl RunStatus {
    pub(crate) fn from_merge(merge: &MergeOutcome) -> Self {
        if merge.created {
            RunStatus::Created
        } else if merge.is_unchanged() {
            RunStatus::Unchanged
        } else {
            RunStatus::Updated
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Created => write!(f, "created"),
            RunStatus::Updated => write!(f, "updated"),
            RunStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Counts and outcomes of a finished run.
#[derive(Debug)]
pub(crate) struct RunReport {
    pub pages_fetched: u32,
    pub records_found: usize,
    pub skipped_items: usize,
    pub stop: StopReason,
    pub merge: MergeOutcome,
}

impl RunReport {
    pub(crate) fn status(&self) -> RunStatus {
        RunStatus::from_merge(&self.merge)
    }

    /// `true` when the very first page could not be fetched, so the run
    /// observed nothing at all.
    pub(crate) fn failed_before_first_page(&self) -> bool {
        self.pages_fetched == 0 && matches!(self.stop, StopReason::FetchFailed { .. })
    }

    /// Process exit code: `1` when nothing could be fetched, the caller's
    /// `unchanged_exit_code` when nothing was written, `0` otherwise.
    pub(crate) fn exit_code(&self, unchanged_exit_code: u8) -> u8 {
        if self.failed_before_first_page() {
            1
        } else if self.status() == RunStatus::Unchanged {
            unchanged_exit_code
        } else {
            0
        }
    }
}

/// Runs one scrape for `search_term` with the backend selected in `config`.
///
/// # Errors
///
/// Returns an error if the fetcher cannot be constructed (invalid base URL,
/// WebDriver unreachable) or if the merge fails. In both cases the store is
/// left as it was.
pub(crate) async fn run_scrape(config: &AppConfig, search_term: &str) -> anyhow::Result<RunReport> {
    let extractor = ListingExtractor::standard()?;
    let plan = SearchPlan {
        search_term,
        page_size: config.page_size,
        max_pages: config.page_limit,
        pagination: config.pagination,
        inter_request_delay_ms: config.inter_request_delay_ms,
    };

    tracing::info!(
        search_term,
        backend = %config.backend,
        pagination = %config.pagination,
        page_size = config.page_size,
        page_limit = config.page_limit,
        "starting scrape"
    );

    let outcome = match config.backend {
        Backend::Http => {
            let fetcher = HttpFetcher::new(
                &config.base_url,
                config.pagination,
                config.request_timeout_secs,
                &config.user_agent,
            )?;
            run_pagination(&fetcher, &extractor, &plan).await
        }
        Backend::Browser => {
            let options = BrowserOptions {
                webdriver_url: &config.webdriver_url,
                user_agent: &config.user_agent,
                headless: config.headless,
                ready_timeout_secs: config.ready_timeout_secs,
            };
            let fetcher = BrowserFetcher::connect(&config.base_url, config.pagination, &options)
                .await
                .context("browser backend could not start")?;
            let outcome = run_pagination(&fetcher, &extractor, &plan).await;
            if let Err(e) = fetcher.close().await {
                tracing::warn!(error = %e, "failed to close WebDriver session");
            }
            outcome
        }
    };

    merge_outcome(config, outcome).await
}

async fn merge_outcome(
    config: &AppConfig,
    outcome: PaginationOutcome,
) -> anyhow::Result<RunReport> {
    let PaginationOutcome {
        records,
        pages_fetched,
        skipped_items,
        stop,
    } = outcome;
    let records_found = records.len();
    let schema = config.backend.schema();
    let path = config.output_path.clone();

    let merge = tokio::task::spawn_blocking(move || merge_into_store(&path, schema, &records))
        .await
        .context("store merge task panicked")?
        .with_context(|| format!("failed to merge into {}", config.output_path.display()))?;

    Ok(RunReport {
        pages_fetched,
        records_found,
        skipped_items,
        stop,
        merge,
    })
}

#[cfg(test)]
#[path = "scrape_test.rs"]
mod tests;
