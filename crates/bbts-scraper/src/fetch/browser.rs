use std::time::Duration;

use async_trait::async_trait;
use bbts_core::PaginationStyle;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};

use super::{search_url, PageFetcher, PageRequest, RawDocument};
use crate::error::FetchError;
use crate::selectors::READY_SIGNAL;

/// Session settings for [`BrowserFetcher::connect`].
#[derive(Debug, Clone)]
pub struct BrowserOptions<'a> {
    /// Endpoint of an already running WebDriver (chromedriver) process.
    pub webdriver_url: &'a str,
    pub user_agent: &'a str,
    pub headless: bool,
    /// Upper bound on the wait for [`READY_SIGNAL`] after each navigation.
    pub ready_timeout_secs: u64,
}

/// Fetcher backed by a WebDriver browser session, for result pages that are
/// only populated after client-side scripts run.
///
/// The session is owned by this value: it is opened by [`Self::connect`] and
/// must be released with [`Self::close`]. Dropping without closing leaves the
/// session to the driver's own idle timeout.
pub struct BrowserFetcher {
    client: Client,
    base_url: String,
    pagination: PaginationStyle,
    ready_timeout: Duration,
}

impl BrowserFetcher {
    /// Opens a Chrome session on the WebDriver at `options.webdriver_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DriverUnavailable`] if the driver is not running
    /// or refuses the session, and [`FetchError::InvalidUrl`] if `base_url`
    /// does not parse. Both are raised before any page is requested.
    pub async fn connect(
        base_url: &str,
        pagination: PaginationStyle,
        options: &BrowserOptions<'_>,
    ) -> Result<Self, FetchError> {
        reqwest::Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let mut args = vec![format!("--user-agent={}", options.user_agent)];
        if options.headless {
            args.push("--headless=new".to_owned());
        }
        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_owned(),
            serde_json::json!({ "args": args }),
        );

        tracing::info!(
            webdriver_url = options.webdriver_url,
            headless = options.headless,
            "starting WebDriver session"
        );
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(options.webdriver_url)
            .await
            .map_err(|e| FetchError::DriverUnavailable {
                webdriver_url: options.webdriver_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            pagination,
            ready_timeout: Duration::from_secs(options.ready_timeout_secs),
        })
    }

    /// Ends the WebDriver session.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Driver`] if the driver rejects the delete-session
    /// command. The session is gone from this process either way.
    pub async fn close(self) -> Result<(), FetchError> {
        tracing::info!("closing WebDriver session");
        self.client.close().await.map_err(|e| FetchError::Driver {
            url: self.base_url,
            reason: e.to_string(),
        })
    }
}

fn driver_error(url: &str, err: &CmdError) -> FetchError {
    FetchError::Driver {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    /// # Errors
    ///
    /// - [`FetchError::Timeout`]: [`READY_SIGNAL`] did not appear in time.
    /// - [`FetchError::Driver`]: navigation or page-source command failed.
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<RawDocument, FetchError> {
        let url = search_url(&self.base_url, self.pagination, request)?;
        tracing::info!(page = request.page_index, %url, "navigating to results page");

        self.client
            .goto(&url)
            .await
            .map_err(|e| driver_error(&url, &e))?;

        tracing::debug!(page = request.page_index, "waiting for results to render");
        match self
            .client
            .wait()
            .at_most(self.ready_timeout)
            .for_element(Locator::Css(READY_SIGNAL))
            .await
        {
            Ok(_) => {}
            Err(CmdError::WaitTimeout) => {
                return Err(FetchError::Timeout {
                    url,
                    waited_secs: self.ready_timeout.as_secs(),
                });
            }
            Err(e) => return Err(driver_error(&url, &e)),
        }

        let html = self
            .client
            .source()
            .await
            .map_err(|e| driver_error(&url, &e))?;
        Ok(RawDocument { url, html })
    }
}
