//! Site client split into focused submodules.
//!
//! The [`SubdivxClient`] struct and its methods are organized by concern:
//! - [`search`] - Query normalization and concurrent result pagination
//! - [`download`] - Download-link resolution, archive fetch and extraction

mod download;
mod search;


use crate::config::Config;
use crate::error::{Error, Result};
use crate::extraction::{ArchiveExtractor, DefaultArchiveExtractor};
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use url::Url;

/// Client for the subdivx subtitle site
///
/// Cheap to clone; clones share the transport and extractor.
#[derive(Clone)]
pub struct SubdivxClient {
    pub(crate) config: Arc<Config>,
    pub(crate) origin: Url,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) extractor: Arc<dyn ArchiveExtractor>,
}

impl SubdivxClient {
    /// Create a client talking HTTP to the configured site
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration does not validate.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use subdivx_dl::{Config, SubdivxClient};
    ///
    /// # async fn example() -> subdivx_dl::Result<()> {
    /// let client = SubdivxClient::new(Config::default())?;
    /// let results = client.search("the terror").await?;
    /// println!("{} results", results.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_components(
            config,
            Arc::new(transport),
            Arc::new(DefaultArchiveExtractor),
        )
    }

    /// Create a client with a custom transport and archive extractor
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `site.origin` is not a valid URL.
    pub fn with_components(
        config: Config,
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn ArchiveExtractor>,
    ) -> Result<Self> {
        let origin = Url::parse(&config.site.origin).map_err(|e| Error::Config {
            message: format!("invalid origin URL {:?}: {}", config.site.origin, e),
            key: Some("site.origin".to_string()),
        })?;

        Ok(Self {
            config: Arc::new(config),
            origin,
            transport,
            extractor,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl std::fmt::Debug for SubdivxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubdivxClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
