//! Configuration types for subdivx-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};

/// Remote site endpoints and request headers
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Search endpoint (default: "http://www.subdivx.com/index.php")
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Site origin used to absolutize relative download links
    /// (default: "http://www.subdivx.com/")
    #[serde(default = "default_origin")]
    pub origin: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            headers: HashMap::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// What to do when one of the pages 2..N cannot be fetched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFailurePolicy {
    /// Fail the whole search with the page's transport error (default)
    #[default]
    Abort,
    /// Log the failure and return results from the pages that succeeded
    Skip,
}

/// Pagination behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum simultaneous page requests (default: 8)
    ///
    /// A hard ceiling on outstanding connections to the site, not a tuning knob.
    #[serde(default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: usize,

    /// Highest page number to fetch (None = every page the pager reports)
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Failure handling for pages after the first
    #[serde(default)]
    pub page_failure: PageFailurePolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pages: default_max_concurrent_pages(),
            max_pages: None,
            page_failure: PageFailurePolicy::default(),
        }
    }
}

/// Retry configuration for 5xx responses
///
/// The defaults mirror the site's historical client: three retries with a
/// fixed one second pause between them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 1 second)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 1.0, i.e. a fixed delay)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// Main configuration for [`SubdivxClient`](crate::SubdivxClient)
///
/// Passed to the client and its transport at construction; nothing is read
/// from global state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote site endpoints and headers
    #[serde(default)]
    pub site: SiteConfig,

    /// Pagination settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Retry settings for 5xx responses
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Check that the configuration can drive a client
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key when a URL does not
    /// parse, a header name or value is not valid HTTP, the page concurrency
    /// is zero, or the retry schedule cannot produce a delay.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.search_url).map_err(|e| Error::Config {
            message: format!("invalid search URL {:?}: {}", self.site.search_url, e),
            key: Some("site.search_url".to_string()),
        })?;

        url::Url::parse(&self.site.origin).map_err(|e| Error::Config {
            message: format!("invalid origin {:?}: {}", self.site.origin, e),
            key: Some("site.origin".to_string()),
        })?;

        for (name, value) in &self.site.headers {
            reqwest::header::HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::Config {
                    message: format!("invalid header name {:?}: {}", name, e),
                    key: Some("site.headers".to_string()),
                }
            })?;
            reqwest::header::HeaderValue::from_str(value).map_err(|e| Error::Config {
                message: format!("invalid value for header {:?}: {}", name, e),
                key: Some("site.headers".to_string()),
            })?;
        }

        if self.search.max_concurrent_pages == 0 {
            return Err(Error::Config {
                message: "max_concurrent_pages must be at least 1".to_string(),
                key: Some("search.max_concurrent_pages".to_string()),
            });
        }

        let multiplier = self.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Error::Config {
                message: format!(
                    "backoff_multiplier must be a finite number >= 1.0, got {multiplier}"
                ),
                key: Some("retry.backoff_multiplier".to_string()),
            });
        }

        if self.retry.initial_delay > self.retry.max_delay {
            return Err(Error::Config {
                message: format!(
                    "initial_delay ({:?}) exceeds max_delay ({:?})",
                    self.retry.initial_delay, self.retry.max_delay
                ),
                key: Some("retry.initial_delay".to_string()),
            });
        }

        Ok(())
    }
}

fn default_search_url() -> String {
    "http://www.subdivx.com/index.php".to_string()
}

fn default_origin() -> String {
    "http://www.subdivx.com/".to_string()
}

fn default_user_agent() -> String {
    concat!("subdivx-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_concurrent_pages() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

// Durations are written as seconds; fractions carry sub-second precision
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid duration {secs}: {e}")))
    }
}
