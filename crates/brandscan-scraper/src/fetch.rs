//! Page retrieval.
//!
//! The scan only ever sees [`PageFetcher`]: content or nothing. Transport
//! details (timeouts, retries, politeness delay, gzip) live in [`HttpFetcher`].

use std::future::Future;
use std::io::Read;
use std::time::Duration;

use brandscan_core::AppConfig;
use flate2::read::GzDecoder;
use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Retrieves the body of a URL.
///
/// Returns `None` on any transport error or non-200 status. Implementations
/// must never panic or surface errors to the caller.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// [`PageFetcher`] backed by `reqwest`.
///
/// Transient errors (429, 5xx, timeouts, connect failures) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
    request_delay: Duration,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
            request_delay: Duration::ZERO,
        })
    }

    /// Builds a fetcher from the process configuration, including its
    /// politeness delay.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Ok(Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )?
        .with_request_delay(Duration::from_millis(config.request_delay_ms)))
    }

    /// Sleep this long before every request attempt.
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Fetches `url` and returns its body as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::UnexpectedStatus`]: any status other than 200.
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    /// - [`ScraperError::Decompress`]: a gzip body that does not inflate.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let response = self
                .client
                .get(url)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .send()
                .await?;
            let status = response.status();

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(ScraperError::RateLimited {
                    domain: domain_of(url),
                    retry_after_secs,
                });
            }

            if status != reqwest::StatusCode::OK {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            let bytes = response.bytes().await?;
            decode_body(url, &bytes)
        })
        .await
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        match self.fetch_text(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!(url, error = %e, "fetch failed");
                None
            }
        }
    }
}

/// Inflates gzip-named bodies that still carry the gzip magic bytes (served
/// without `Content-Encoding`); everything else is decoded as lossy UTF-8.
fn decode_body(url: &str, bytes: &[u8]) -> Result<String, ScraperError> {
    let gz_named = reqwest::Url::parse(url)
        .is_ok_and(|u| u.path().to_ascii_lowercase().ends_with(".gz"));

    if gz_named && bytes.starts_with(&GZIP_MAGIC) {
        let mut out = String::new();
        GzDecoder::new(bytes)
            .read_to_string(&mut out)
            .map_err(|e| ScraperError::Decompress {
                url: url.to_owned(),
                source: e,
            })?;
        return Ok(out);
    }

    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn domain_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
