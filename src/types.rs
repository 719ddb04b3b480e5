//! Core types for subdivx-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Value of the site's fixed `accion` parameter for a search
pub const SEARCH_ACTION: &str = "5";

/// File extensions accepted as subtitle payloads (lowercase, no dot)
pub const SUBTITLE_EXTENSIONS: [&str; 6] = ["srt", "ssa", "ass", "sub", "usf", "ssf"];

/// A normalized free-text search
///
/// Tokens are split on whitespace and joined with `+`, the form the search
/// endpoint expects in its `buscar` parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    terms: String,
}

impl SearchQuery {
    /// Normalize a free-text query
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] when the text holds no tokens.
    pub fn new(text: &str) -> Result<Self> {
        let terms = text.split_whitespace().collect::<Vec<_>>().join("+");
        if terms.is_empty() {
            return Err(Error::InvalidQuery(text.to_string()));
        }
        Ok(Self { terms })
    }

    /// Normalized search terms
    pub fn terms(&self) -> &str {
        &self.terms
    }

    /// Query parameters for the first result page
    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            ("buscar".to_string(), self.terms.clone()),
            ("accion".to_string(), SEARCH_ACTION.to_string()),
        ]
    }

    /// Query parameters for result page `page`
    ///
    /// Each call builds a fresh vector, so concurrent page requests never
    /// share the page-number field.
    pub fn page_params(&self, page: u32) -> Vec<(String, String)> {
        let mut params = self.params();
        params.push(("pg".to_string(), page.to_string()));
        params
    }
}

/// One search result
///
/// All fields are fixed at construction except the download link, which is
/// resolved from the detail page on first download and then reused.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subtitle {
    /// Result title, e.g. "Subtitulo de The Terror (1963)"
    pub title: String,
    /// Free-text description, possibly empty
    pub description: String,
    /// Download counter shown by the site (0 when unreadable)
    pub downloads: u64,
    /// Absolute URL of the detail page
    pub link: String,
    #[serde(skip)]
    pub(crate) download_link: OnceCell<String>,
}

impl Subtitle {
    /// Create a subtitle record with an unresolved download link
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        downloads: u64,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            downloads,
            link: link.into(),
            download_link: OnceCell::new(),
        }
    }

    /// Download link, if it has already been resolved
    pub fn download_link(&self) -> Option<&str> {
        self.download_link.get().map(String::as_str)
    }
}

/// A subtitle file taken out of a downloaded archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubtitleFile {
    /// File name as stored in the archive
    pub filename: String,
    /// Lowercase extension without the leading dot
    pub extension: String,
    /// Raw file content
    pub content: Vec<u8>,
}

/// Everything read from one search result page
#[derive(Clone, Debug, Default)]
pub struct ParsedPage {
    /// Records in document order
    pub subtitles: Vec<Subtitle>,
    /// Page count reported by the pager (0 = single page or unknown)
    pub total_pages: u32,
}

/// Archive container format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    /// RAR archive (.rar)
    Rar,
    /// 7-Zip archive (.7z)
    SevenZip,
    /// ZIP archive (.zip)
    Zip,
}

impl ArchiveType {
    /// Conventional file extension (no dot)
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveType::Rar => "rar",
            ArchiveType::SevenZip => "7z",
            ArchiveType::Zip => "zip",
        }
    }
}
