use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::ACCEPT;
use tracing::{debug, info};

use crate::core::config::FeedConfig;

pub const FEED_ACCEPT: &str = "application/xml, text/xml, */*";

/// Characters left unescaped in a URI component: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("request failed: {0}")]
    FetchFailed(#[source] reqwest::Error),
}

/// Reads the DGT situation feed through the CORS relay.
///
/// Holds no state between calls besides the pooled HTTP client; every call
/// performs a fresh request.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(FetchError::FetchFailed)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn relay_url(&self) -> String {
        build_relay_url(&self.config.relay_url, &self.config.feed_url)
    }

    /// One GET through the relay, bounded by `request_timeout` from send
    /// until the body has been read.
    pub async fn fetch_raw(&self) -> Result<String, FetchError> {
        let url = self.relay_url();
        let timeout = self.config.request_timeout;
        debug!(%url, ?timeout, "requesting feed");

        let body = tokio::time::timeout(timeout, self.fetch_body(&url))
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        info!(bytes = body.len(), "feed received");
        Ok(body)
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, FEED_ACCEPT)
            .send()
            .await
            .map_err(|error| self.classify(error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(|error| self.classify(error))
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.config.request_timeout)
        } else {
            FetchError::FetchFailed(error)
        }
    }
}

pub fn build_relay_url(relay_base: &str, feed_url: &str) -> String {
    format!(
        "{relay_base}{}",
        utf8_percent_encode(feed_url, URI_COMPONENT)
    )
}
