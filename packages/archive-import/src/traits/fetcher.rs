//! Fetcher trait for pluggable page download.
//!
//! The crawler talks to source sites only through this seam, so tests can
//! script responses and production code can wrap the HTTP client with
//! politeness policies.

use async_trait::async_trait;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};

/// Downloads page bodies from source sites.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a URL and return the response body as text.
    async fn fetch(&self, url: &str) -> FetchResult<String>;

    /// Submit a form back to `url` and return the resulting body.
    ///
    /// Used for the mature-content acknowledgement some journal sites
    /// interpose before the real content.
    async fn submit_form(&self, url: &str, fields: &[(&str, &str)]) -> FetchResult<String>;
}

/// HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: "ArchiveImportBot/1.0".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn read_body(&self, response: reqwest::Response, url: &str) -> FetchResult<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(Box::new(std::io::Error::other(format!(
                "HTTP {status} from {url}"
            )))));
        }
        response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        debug!(url = %url, "fetch starting");
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                FetchError::Http(Box::new(e))
            })?;

        self.read_body(response, url).await
    }

    async fn submit_form(&self, url: &str, fields: &[(&str, &str)]) -> FetchResult<String> {
        debug!(url = %url, "form submission");
        let response = self
            .client
            .post(url)
            .header("User-Agent", &self.user_agent)
            .form(fields)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        self.read_body(response, url).await
    }
}

/// Default sustained request rate against any single host.
const DEFAULT_HOST_RPS: NonZeroU32 = nonzero!(1u32);

/// A fetcher wrapper that rate-limits requests per remote host.
///
/// Politeness toward source sites: a chaptered crawl issues many requests
/// against one host, and nothing upstream bounds how many items of a batch
/// point at the same site.
pub struct PoliteFetcher<F: Fetcher> {
    inner: F,
    limiter: DefaultKeyedRateLimiter<String>,
}

impl<F: Fetcher> PoliteFetcher<F> {
    /// Wrap a fetcher with the default per-host rate.
    pub fn new(fetcher: F) -> Self {
        Self::with_host_rate(fetcher, DEFAULT_HOST_RPS.get())
    }

    /// Wrap a fetcher with a custom sustained per-host rate.
    pub fn with_host_rate(fetcher: F, requests_per_second: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second).expect("requests_per_second must be > 0"),
        );
        Self {
            inner: fetcher,
            limiter: RateLimiter::keyed(quota),
        }
    }

    async fn wait_for_host(&self, url: &str) {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_default();
        self.limiter.until_key_ready(&host).await;
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for PoliteFetcher<F> {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.wait_for_host(url).await;
        self.inner.fetch(url).await
    }

    async fn submit_form(&self, url: &str, fields: &[(&str, &str)]) -> FetchResult<String> {
        self.wait_for_host(url).await;
        self.inner.submit_form(url, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[tokio::test]
    async fn test_polite_fetcher_delegates() {
        let inner = MockFetcher::new().with_body("http://example.com/1", "body one");
        let polite = PoliteFetcher::with_host_rate(inner, 100);

        let body = polite.fetch("http://example.com/1").await.unwrap();
        assert_eq!(body, "body one");
    }
}
