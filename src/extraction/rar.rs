use crate::error::{ExtractionError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Archive extractor for RAR files
pub struct RarExtractor;

impl RarExtractor {
    fn convert_unrar_error(e: unrar::error::UnrarError, archive_path: &Path) -> ExtractionError {
        ExtractionError::Failed {
            archive: archive_path.to_path_buf(),
            reason: e.to_string(),
        }
    }

    /// Extract every file entry of a RAR archive into `dest_path`
    ///
    /// Entry names are reduced to their normal path components, so an entry
    /// such as `../../etc/passwd` cannot escape the destination.
    pub fn try_extract(archive_path: &Path, dest_path: &Path) -> Result<Vec<PathBuf>> {
        debug!(?archive_path, ?dest_path, "attempting RAR extraction");

        std::fs::create_dir_all(dest_path)?;

        let processor = unrar::Archive::new(archive_path)
            .open_for_processing()
            .map_err(|e| Self::convert_unrar_error(e, archive_path))?;

        let mut extracted_files = Vec::new();

        let mut at_header = processor;
        loop {
            let at_file = match at_header.read_header() {
                Ok(Some(entry_processor)) => entry_processor,
                Ok(None) => break,
                Err(e) => return Err(Self::convert_unrar_error(e, archive_path).into()),
            };

            let header = at_file.entry();

            let sanitized = Path::new(&header.filename)
                .components()
                .filter(|c| matches!(c, std::path::Component::Normal(_)))
                .collect::<PathBuf>();

            if sanitized.as_os_str().is_empty() || header.is_directory() {
                at_header = at_file
                    .skip()
                    .map_err(|e| Self::convert_unrar_error(e, archive_path))?;
                continue;
            }

            let file_path = dest_path.join(&sanitized);
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            at_header = at_file
                .extract_to(&file_path)
                .map_err(|e| Self::convert_unrar_error(e, archive_path))?;
            extracted_files.push(file_path);
        }

        info!(
            ?archive_path,
            extracted_count = extracted_files.len(),
            "RAR extraction successful"
        );

        Ok(extracted_files)
    }
}
