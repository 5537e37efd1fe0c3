use std::time::Duration;

use async_trait::async_trait;
use bbts_core::PaginationStyle;
use reqwest::Client;

use super::{search_url, PageFetcher, PageRequest, RawDocument};
use crate::error::FetchError;

/// Upper bound on establishing the TCP/TLS connection, separate from the
/// overall request timeout.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Stateless fetcher for server-rendered search pages.
///
/// Handles non-2xx responses and request timeouts as typed errors. Never
/// retries; see [`PageFetcher`].
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    pagination: PaginationStyle,
    timeout_secs: u64,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` with the given request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` does not parse, or
    /// [`FetchError::Transport`] if the underlying `reqwest::Client` cannot be
    /// constructed (e.g., invalid TLS config).
    pub fn new(
        base_url: &str,
        pagination: PaginationStyle,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        reqwest::Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            pagination,
            timeout_secs,
        })
    }

    /// Seconds actually waited before a timeout fired: the connect bound when
    /// the connection never came up, the request bound otherwise.
    fn waited_secs(&self, during_connect: bool) -> u64 {
        if during_connect {
            CONNECT_TIMEOUT_SECS.min(self.timeout_secs)
        } else {
            self.timeout_secs
        }
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_owned(),
                waited_secs: self.waited_secs(err.is_connect()),
            }
        } else {
            FetchError::Transport(err)
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// # Errors
    ///
    /// - [`FetchError::HttpStatus`]: any non-2xx status.
    /// - [`FetchError::Timeout`]: the request exceeded the configured timeout.
    /// - [`FetchError::Transport`]: network or TLS failure.
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<RawDocument, FetchError> {
        let url = search_url(&self.base_url, self.pagination, request)?;
        tracing::info!(page = request.page_index, %url, "fetching results page");

        let response = self
            .client
            .get(&url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let html = response.text().await.map_err(|e| self.classify(&url, e))?;
        Ok(RawDocument { url, html })
    }
}
