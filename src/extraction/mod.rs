//! Archive extraction
//!
//! Subtitles come packed in RAR, 7z or ZIP archives. [`extract_subtitles`]
//! spills a downloaded archive into a scoped temporary file, unpacks it into a
//! scoped temporary directory through an [`ArchiveExtractor`], and returns the
//! allow-listed subtitle files it finds there. Both temporary locations are
//! removed before the call returns, whatever the outcome.

mod rar;
mod sevenz;
mod shared;
mod zip;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use rar::RarExtractor;
pub use sevenz::SevenZipExtractor;
pub use shared::{
    archive_type_from_extension, collect_subtitle_files, detect_archive_type, sniff_archive_type,
    subtitle_extension,
};
pub use zip::ZipExtractor;

use crate::error::{ExtractionError, Result};
use crate::types::{ArchiveType, SubtitleFile};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Unpacks an archive file into a directory
///
/// Implementations run on a blocking thread and may do synchronous I/O.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive_path` into `dest_path`, returning the written files
    fn extract(&self, archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>>;
}

/// Extractor that detects the archive type and routes to the matching backend
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultArchiveExtractor;

impl ArchiveExtractor for DefaultArchiveExtractor {
    fn extract(&self, archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        let archive_type =
            detect_archive_type(archive_path)?.ok_or_else(|| ExtractionError::UnknownFormat {
                archive: archive_path.to_path_buf(),
            })?;

        debug!(?archive_path, ?archive_type, "dispatching extraction");

        match archive_type {
            ArchiveType::Rar => RarExtractor::try_extract(archive_path, dest_path),
            ArchiveType::SevenZip => SevenZipExtractor::try_extract(archive_path, dest_path),
            ArchiveType::Zip => ZipExtractor::try_extract(archive_path, dest_path),
        }
    }
}

/// Temp-file suffix derived from the archive URL (".rar", ".zip", ...)
fn archive_suffix(source_url: &str) -> String {
    let path = url::Url::parse(source_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| source_url.to_string());

    archive_type_from_extension(Path::new(&path))
        .map(|t| format!(".{}", t.extension()))
        .unwrap_or_default()
}

/// Unpack archive bytes and return the subtitle files inside
///
/// `source_url` is the final URL the archive was served from; its extension is
/// kept on the temporary file as a hint for format detection.
///
/// # Errors
///
/// Returns [`ExtractionError::NoSubtitleFound`] when the archive holds no
/// file with an allow-listed extension, or any error the extractor reports.
pub async fn extract_subtitles(
    bytes: &[u8],
    source_url: &str,
    extractor: Arc<dyn ArchiveExtractor>,
) -> Result<Vec<SubtitleFile>> {
    let bytes = bytes.to_vec();
    let suffix = archive_suffix(source_url);

    // Temporary paths are owned by the blocking task and outlive a dropped caller.
    let files = tokio::task::spawn_blocking(move || -> Result<Vec<SubtitleFile>> {
        let mut archive = tempfile::Builder::new()
            .prefix("subdivx-")
            .suffix(&suffix)
            .tempfile()?;
        archive.write_all(&bytes)?;
        archive.flush()?;

        let output = tempfile::Builder::new().prefix("subdivx-").tempdir()?;

        extractor.extract(archive.path(), output.path())?;
        collect_subtitle_files(output.path())
    })
    .await
    .map_err(|e| ExtractionError::TaskPanicked(e.to_string()))??;

    if files.is_empty() {
        return Err(ExtractionError::NoSubtitleFound.into());
    }

    info!(
        source_url,
        count = files.len(),
        "extracted subtitle files from archive"
    );

    Ok(files)
}
