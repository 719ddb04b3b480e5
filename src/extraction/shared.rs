use crate::error::{Error, Result};
use crate::types::{ArchiveType, SUBTITLE_EXTENSIONS, SubtitleFile};
use std::io::Read;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const RAR_MAGIC: &[u8] = b"Rar!\x1a\x07";
const SEVEN_ZIP_MAGIC: &[u8] = b"7z\xbc\xaf\x27\x1c";

/// Identify an archive format from its leading bytes
pub fn sniff_archive_type(header: &[u8]) -> Option<ArchiveType> {
    if header.starts_with(ZIP_MAGIC) {
        Some(ArchiveType::Zip)
    } else if header.starts_with(RAR_MAGIC) {
        Some(ArchiveType::Rar)
    } else if header.starts_with(SEVEN_ZIP_MAGIC) {
        Some(ArchiveType::SevenZip)
    } else {
        None
    }
}

/// Identify an archive format from a file extension
pub fn archive_type_from_extension(path: &Path) -> Option<ArchiveType> {
    let ext = path.extension()?.to_str()?.to_lowercase();

    match ext.as_str() {
        "rar" => Some(ArchiveType::Rar),
        "7z" => Some(ArchiveType::SevenZip),
        "zip" => Some(ArchiveType::Zip),
        _ => None,
    }
}

/// Detect the archive type of a file on disk
///
/// Magic bytes win; the extension is only consulted when the header is not
/// recognized (the site does not always name its archives after their format).
pub fn detect_archive_type(path: &Path) -> Result<Option<ArchiveType>> {
    let mut header = Vec::with_capacity(8);
    std::fs::File::open(path)?
        .take(8)
        .read_to_end(&mut header)?;

    Ok(sniff_archive_type(&header).or_else(|| archive_type_from_extension(path)))
}

/// Normalized subtitle extension of `path`, if it is allow-listed
pub fn subtitle_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    SUBTITLE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Read every allow-listed subtitle file below `dir`
///
/// Files are visited in sorted directory-listing order so the result does not
/// depend on the file system.
pub fn collect_subtitle_files(dir: &Path) -> Result<Vec<SubtitleFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(extension) = subtitle_extension(path) else {
            debug!(?path, "skipping non-subtitle file");
            continue;
        };

        files.push(SubtitleFile {
            filename: entry.file_name().to_string_lossy().into_owned(),
            extension,
            content: std::fs::read(path)?,
        });
    }

    Ok(files)
}
