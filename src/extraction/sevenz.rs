use crate::error::{ExtractionError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Archive extractor for 7z files
pub struct SevenZipExtractor;

impl SevenZipExtractor {
    /// Extract a 7z archive into `dest_path`
    pub fn try_extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "attempting 7z extraction");

        std::fs::create_dir_all(dest_path)?;

        sevenz_rust::decompress_file(archive_path, dest_path).map_err(|e| {
            ExtractionError::Failed {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to extract 7z archive: {}", e),
            }
        })?;

        let extracted_files = Self::collect_extracted_files(archive_path, dest_path)?;

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "7z extraction successful"
        );
        Ok(extracted_files)
    }

    /// List extracted files, rejecting any that resolve outside `dest_path`
    fn collect_extracted_files(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        let canonical_dest = dest_path.canonicalize()?;
        let mut files = Vec::new();

        for entry in WalkDir::new(dest_path) {
            let entry = entry.map_err(|e| crate::Error::Io(e.into()))?;
            let canonical = entry.path().canonicalize()?;
            if !canonical.starts_with(&canonical_dest) {
                return Err(ExtractionError::Failed {
                    archive: archive_path.to_path_buf(),
                    reason: format!(
                        "path traversal detected: extracted file {:?} is outside destination",
                        canonical
                    ),
                }
                .into());
            }
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }
}
