//! Download-link resolution, archive fetch and extraction

use super::SubdivxClient;
use crate::error::{DownloadError, Result};
use crate::extraction::extract_subtitles;
use crate::parser::parse_download_link;
use crate::types::{Subtitle, SubtitleFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

impl SubdivxClient {
    /// Resolve the archive URL behind a subtitle's detail page
    ///
    /// The detail page is fetched at most once per record: the link is stored
    /// in the record and concurrent callers wait for the same resolution.
    pub async fn resolve_download_link<'a>(&self, subtitle: &'a Subtitle) -> Result<&'a str> {
        let link = subtitle
            .download_link
            .get_or_try_init(|| async {
                debug!(link = %subtitle.link, "resolving download link");
                let html = self
                    .transport
                    .fetch_text(&subtitle.link, &[])
                    .await
                    .map_err(DownloadError::from)?;

                parse_download_link(&html, &self.origin).ok_or_else(|| {
                    DownloadError::NoDownloadLink {
                        link: subtitle.link.clone(),
                    }
                })
            })
            .await?;

        Ok(link.as_str())
    }

    /// Download a subtitle's archive and return the subtitle files inside
    ///
    /// # Errors
    ///
    /// - [`DownloadError`] when the link cannot be resolved, the archive
    ///   request fails, or it answers with a status of 400 or above
    /// - [`ExtractionError`](crate::error::ExtractionError) when the archive
    ///   cannot be unpacked or holds no subtitle file
    pub async fn download(&self, subtitle: &Subtitle) -> Result<Vec<SubtitleFile>> {
        let link = self.resolve_download_link(subtitle).await?;

        let fetched = self
            .transport
            .fetch_bytes(link)
            .await
            .map_err(DownloadError::from)?;

        if fetched.status >= 400 {
            return Err(DownloadError::HttpStatus {
                url: fetched.url,
                status: fetched.status,
            }
            .into());
        }

        debug!(
            url = %fetched.url,
            size = fetched.bytes.len(),
            "fetched subtitle archive"
        );

        extract_subtitles(&fetched.bytes, &fetched.url, Arc::clone(&self.extractor)).await
    }

    /// Download a subtitle and write its files into `dir`
    ///
    /// `dir` is created if missing. Files are written under their archive
    /// file name; a later file with the same name replaces an earlier one.
    pub async fn download_to(
        &self,
        subtitle: &Subtitle,
        dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let files = self.download(subtitle).await?;

        tokio::fs::create_dir_all(dir).await?;

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let path = dir.join(&file.filename);
            tokio::fs::write(&path, &file.content).await?;
            written.push(path);
        }

        info!(title = %subtitle.title, ?dir, count = written.len(), "saved subtitle files");
        Ok(written)
    }
}
