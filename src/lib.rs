//! # subdivx-dl
//!
//! Async client library for the subdivx subtitle site.
//!
//! ## Design Philosophy
//!
//! subdivx-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Sensible defaults** - Talks to the public site out of the box
//! - **Polite** - Result pages are fetched concurrently but with a hard bound
//! - **Forgiving** - Markup changes degrade to fewer results, never to errors
//!
//! ## Quick Start
//!
//! ```no_run
//! use subdivx_dl::{Config, SubdivxClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SubdivxClient::new(Config::default())?;
//!
//!     let results = client.search("the terror 1963").await?;
//!     for subtitle in &results {
//!         println!("{} ({} downloads)", subtitle.title, subtitle.downloads);
//!     }
//!
//!     if let Some(best) = results.iter().max_by_key(|s| s.downloads) {
//!         for file in client.download(best).await? {
//!             println!("{} ({} bytes)", file.filename, file.content.len());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Site client (search and download)
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive extraction
pub mod extraction;
/// HTML extraction for result and detail pages
pub mod parser;
/// Retry logic with backoff
pub mod retry;
/// HTTP transport
pub mod transport;
/// Core types
pub mod types;


// Re-export commonly used types
pub use client::SubdivxClient;
pub use config::{Config, PageFailurePolicy, RetryConfig, SearchConfig, SiteConfig};
pub use error::{DownloadError, Error, ExtractionError, Result, TransportError};
pub use extraction::{ArchiveExtractor, DefaultArchiveExtractor};
pub use transport::{FetchedBytes, HttpTransport, Transport};
pub use types::{ArchiveType, SearchQuery, Subtitle, SubtitleFile};
