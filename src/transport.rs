//! HTTP transport
//!
//! [`Transport`] is the seam between the search/download logic and the
//! network. [`HttpTransport`] is the reqwest-backed implementation: it sends
//! the configured headers with every request and retries 5xx answers through
//! [`fetch_with_retry`](crate::retry::fetch_with_retry).

use crate::config::{Config, RetryConfig};
use crate::error::{Error, Result, TransportError};
use crate::retry::fetch_with_retry;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

/// Raw response of a binary fetch
#[derive(Clone, Debug)]
pub struct FetchedBytes {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub bytes: Vec<u8>,
}

/// Issues GET requests against the remote site
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `query` appended and return the body as text
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] for request failures, for any non-success
    /// status, and once 5xx retries are exhausted.
    async fn fetch_text(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> std::result::Result<String, TransportError>;

    /// GET `url` and return the raw body with its final URL and status
    ///
    /// Only 5xx answers are treated as failures (after retries); any other
    /// status is returned to the caller to judge.
    async fn fetch_bytes(&self, url: &str) -> std::result::Result<FetchedBytes, TransportError>;
}

/// reqwest-backed [`Transport`] with retry on server errors
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl HttpTransport {
    /// Build a transport from the site and retry settings of `config`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a configured header is not valid HTTP or
    /// the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.site.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::Config {
                message: format!("invalid header name {:?}: {}", name, e),
                key: Some("site.headers".to_string()),
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| Error::Config {
                message: format!("invalid value for header {:?}: {}", name, e),
                key: Some("site.headers".to_string()),
            })?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(config.site.user_agent.clone())
            .default_headers(headers)
            .timeout(config.site.request_timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {}", e),
                key: None,
            })?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    async fn send(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> std::result::Result<reqwest::Response, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "received response");

        if status.is_server_error() {
            return Err(TransportError::ServerError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> std::result::Result<String, TransportError> {
        let response = fetch_with_retry(&self.retry, || self.send(url, query)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| TransportError::Body {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> std::result::Result<FetchedBytes, TransportError> {
        let response = fetch_with_retry(&self.retry, || self.send(url, &[])).await?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Body {
                url: url.to_string(),
                source,
            })?;

        Ok(FetchedBytes {
            url: final_url,
            status,
            bytes: bytes.to_vec(),
        })
    }
}
