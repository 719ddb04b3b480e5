//! Error types for subdivx-dl
//!
//! This module provides the error taxonomy for the library:
//! - [`TransportError`] for HTTP failures (surfaced by `search`)
//! - [`DownloadError`] for download-link resolution and archive fetch failures
//! - [`ExtractionError`] for archive extraction and subtitle filtering failures
//!
//! Malformed markup is never an error. The page extractor degrades to benign
//! defaults (dropped sections, zero pages, zero downloads) and logs instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for subdivx-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for subdivx-dl
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failed after retries or on a non-retryable status
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Download link could not be resolved or the archive could not be fetched
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// Archive could not be extracted or held no subtitle files
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Search query has no searchable tokens
    #[error("invalid search query: {0:?}")]
    InvalidQuery(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "site.search_url")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server answered with a 5xx status (retryable)
    #[error("server error {status} from {url}")]
    ServerError {
        /// Requested URL
        url: String,
        /// HTTP status code (500-599)
        status: u16,
    },

    /// Server answered with a non-success status that is not retried
    #[error("unexpected status {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The request could not be sent (DNS, connect, TLS, timeout)
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be read
    #[error("failed to read response body from {url}: {source}")]
    Body {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    /// URL of the request that failed
    pub fn url(&self) -> &str {
        match self {
            TransportError::ServerError { url, .. }
            | TransportError::Status { url, .. }
            | TransportError::Request { url, .. }
            | TransportError::Body { url, .. } => url,
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::ServerError { status, .. } | TransportError::Status { status, .. } => {
                Some(*status)
            }
            TransportError::Request { .. } | TransportError::Body { .. } => None,
        }
    }
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The detail page carried no recognizable download link
    #[error("no download link found on {link}")]
    NoDownloadLink {
        /// Detail page that was inspected
        link: String,
    },

    /// Archive request answered with an error status (>= 400)
    #[error("archive request to {url} returned status {status}")]
    HttpStatus {
        /// Final URL of the archive request
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Detail page or archive could not be fetched
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Archive extraction errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Archive format not recognized from magic bytes or extension
    #[error("unknown archive format for {archive}")]
    UnknownFormat {
        /// Archive file that could not be identified
        archive: PathBuf,
    },

    /// Archive tool reported a failure
    #[error("failed to extract {archive}: {reason}")]
    Failed {
        /// Archive file that failed to extract
        archive: PathBuf,
        /// The reason extraction failed
        reason: String,
    },

    /// Archive extracted fine but held no allow-listed subtitle file
    #[error("no valid subtitle found in archive")]
    NoSubtitleFound,

    /// The blocking extraction task panicked or was cancelled
    #[error("extraction task failed: {0}")]
    TaskPanicked(String),
}

impl Error {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Transport(e) => match e {
                TransportError::ServerError { .. } => "server_error",
                TransportError::Status { .. } => "unexpected_status",
                TransportError::Request { .. } => "request_failed",
                TransportError::Body { .. } => "body_read_failed",
            },
            Error::Download(e) => match e {
                DownloadError::NoDownloadLink { .. } => "no_download_link",
                DownloadError::HttpStatus { .. } => "archive_http_status",
                DownloadError::Transport(_) => "download_transport_error",
            },
            Error::Extraction(e) => match e {
                ExtractionError::UnknownFormat { .. } => "unknown_archive_format",
                ExtractionError::Failed { .. } => "extraction_failed",
                ExtractionError::NoSubtitleFound => "no_subtitle_found",
                ExtractionError::TaskPanicked(_) => "extraction_task_failed",
            },
            Error::InvalidQuery(_) => "invalid_query",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
        }
    }
}
