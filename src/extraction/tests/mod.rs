use crate::error::{Error, ExtractionError};
use crate::extraction::*;
use crate::testing::MockExtractor;
use crate::types::ArchiveType;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a ZIP archive in memory from (name, content) pairs
fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ::zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        std::io::Write::write_all(&mut writer, content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Build a 7z archive from a directory populated with (name, content) pairs
fn sevenz_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let source = TempDir::new().unwrap();
    for (name, content) in files {
        std::fs::write(source.path().join(name), content).unwrap();
    }
    let out = TempDir::new().unwrap();
    let archive_path = out.path().join("subs.7z");
    sevenz_rust::compress_to_path(source.path(), &archive_path).unwrap();
    std::fs::read(archive_path).unwrap()
}

fn default_extractor() -> Arc<dyn ArchiveExtractor> {
    Arc::new(DefaultArchiveExtractor)
}

fn filenames(files: &[crate::types::SubtitleFile]) -> Vec<&str> {
    files.iter().map(|f| f.filename.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Type detection
// ---------------------------------------------------------------------------

#[test]
fn test_sniff_archive_type_by_magic() {
    assert_eq!(sniff_archive_type(b"PK\x03\x04rest"), Some(ArchiveType::Zip));
    assert_eq!(sniff_archive_type(b"Rar!\x1a\x07\x01\x00"), Some(ArchiveType::Rar));
    assert_eq!(
        sniff_archive_type(b"7z\xbc\xaf\x27\x1c\x00\x04"),
        Some(ArchiveType::SevenZip)
    );
    assert_eq!(sniff_archive_type(b"<html>"), None);
    assert_eq!(sniff_archive_type(b""), None);
}

#[test]
fn test_archive_type_from_extension() {
    assert_eq!(
        archive_type_from_extension(Path::new("sub.RAR")),
        Some(ArchiveType::Rar)
    );
    assert_eq!(
        archive_type_from_extension(Path::new("sub.7z")),
        Some(ArchiveType::SevenZip)
    );
    assert_eq!(
        archive_type_from_extension(Path::new("sub.zip")),
        Some(ArchiveType::Zip)
    );
    assert_eq!(archive_type_from_extension(Path::new("sub.srt")), None);
    assert_eq!(archive_type_from_extension(Path::new("sub")), None);
}

#[test]
fn test_detect_archive_type_prefers_magic_over_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mislabelled.rar");
    std::fs::write(&path, zip_bytes(&[("a.srt", b"hola")])).unwrap();

    assert_eq!(detect_archive_type(&path).unwrap(), Some(ArchiveType::Zip));
}

#[test]
fn test_detect_archive_type_falls_back_to_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.7z");
    std::fs::write(&path, b"7z").unwrap();

    assert_eq!(
        detect_archive_type(&path).unwrap(),
        Some(ArchiveType::SevenZip)
    );
}

#[test]
fn test_subtitle_extension_is_case_insensitive() {
    assert_eq!(subtitle_extension(Path::new("a.SRT")), Some("srt".to_string()));
    assert_eq!(subtitle_extension(Path::new("b.Ass")), Some("ass".to_string()));
    assert_eq!(subtitle_extension(Path::new("c.usf")), Some("usf".to_string()));
    assert_eq!(subtitle_extension(Path::new("d.nfo")), None);
    assert_eq!(subtitle_extension(Path::new("srt")), None);
}

#[test]
fn test_archive_suffix_from_url() {
    assert_eq!(archive_suffix("http://x.test/sub9/342990.rar"), ".rar");
    assert_eq!(archive_suffix("http://x.test/sub9/342990.ZIP?x=1"), ".zip");
    assert_eq!(archive_suffix("http://x.test/bajar.php?id=1"), "");
    assert_eq!(archive_suffix("not a url"), "");
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

#[test]
fn test_zip_extractor_writes_entries() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("subs.zip");
    std::fs::write(
        &archive,
        zip_bytes(&[("a.srt", b"one"), ("nested/b.ass", b"two")]),
    )
    .unwrap();
    let dest = dir.path().join("out");

    let mut files = ZipExtractor::try_extract(&archive, &dest).unwrap();
    files.sort();

    assert_eq!(files, vec![dest.join("a.srt"), dest.join("nested/b.ass")]);
    assert_eq!(std::fs::read(dest.join("nested/b.ass")).unwrap(), b"two");
}

#[test]
fn test_zip_extractor_skips_traversal_entries() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("evil.zip");
    std::fs::write(
        &archive,
        zip_bytes(&[("../evil.srt", b"x"), ("ok.srt", b"y")]),
    )
    .unwrap();
    let dest = dir.path().join("out");

    let files = ZipExtractor::try_extract(&archive, &dest).unwrap();

    assert_eq!(files, vec![dest.join("ok.srt")]);
    assert!(!dir.path().join("evil.srt").exists());
}

#[test]
fn test_zip_extractor_rejects_corrupt_archive() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("broken.zip");
    std::fs::write(&archive, b"PK\x03\x04 definitely not a zip").unwrap();

    let err = ZipExtractor::try_extract(&archive, &dir.path().join("out")).unwrap_err();

    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::Failed { .. })
    ));
}

#[test]
fn test_rar_extractor_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("broken.rar");
    std::fs::write(&archive, b"this is not a rar archive").unwrap();

    let err = RarExtractor::try_extract(&archive, &dir.path().join("out")).unwrap_err();

    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::Failed { .. })
    ));
}

#[test]
fn test_default_extractor_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("page.html");
    std::fs::write(&archive, b"<html>not an archive</html>").unwrap();

    let err = DefaultArchiveExtractor
        .extract(&archive, &dir.path().join("out"))
        .unwrap_err();

    assert_eq!(err.error_code(), "unknown_archive_format");
}

// ---------------------------------------------------------------------------
// extract_subtitles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_extract_subtitles_from_zip_filters_allow_list() {
    let bytes = zip_bytes(&[
        ("a.srt", b"one"),
        ("b.nfo", b"notes"),
        ("sub/c.SUB", b"three"),
    ]);

    let files = extract_subtitles(&bytes, "http://x.test/sub9/1.zip", default_extractor())
        .await
        .unwrap();

    assert_eq!(filenames(&files), vec!["a.srt", "c.SUB"]);
    assert_eq!(files[1].extension, "sub");
    assert_eq!(files[1].content, b"three");
}

#[tokio::test]
async fn test_extract_subtitles_ignores_misleading_url_extension() {
    let bytes = zip_bytes(&[("movie.ssa", b"[Script Info]")]);

    let files = extract_subtitles(&bytes, "http://x.test/sub9/1.rar", default_extractor())
        .await
        .unwrap();

    assert_eq!(filenames(&files), vec!["movie.ssa"]);
}

#[tokio::test]
async fn test_extract_subtitles_from_7z() {
    let bytes = sevenz_bytes(&[("movie.ass", b"[Script Info]"), ("cover.jpg", b"\xff\xd8")]);

    let files = extract_subtitles(&bytes, "http://x.test/bajar.php?id=1", default_extractor())
        .await
        .unwrap();

    assert_eq!(filenames(&files), vec!["movie.ass"]);
    assert_eq!(files[0].content, b"[Script Info]");
}

#[tokio::test]
async fn test_extract_subtitles_without_subtitles_fails() {
    let bytes = zip_bytes(&[("readme.txt", b"hola"), ("cover.jpg", b"\xff\xd8")]);

    let err = extract_subtitles(&bytes, "http://x.test/1.zip", default_extractor())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::NoSubtitleFound)
    ));
}

#[tokio::test]
async fn test_extract_subtitles_propagates_extractor_failure() {
    let extractor = Arc::new(MockExtractor::failing("corrupt header"));

    let err = extract_subtitles(b"whatever", "http://x.test/1.rar", extractor)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Extraction(ExtractionError::Failed { ref reason, .. }) if reason == "corrupt header"
    ));
}

#[tokio::test]
async fn test_extract_subtitles_removes_temporary_directory() {
    let extractor = Arc::new(MockExtractor::with_files(&[("a.srt", "hola")]));

    let files = extract_subtitles(b"archive", "http://x.test/1.zip", extractor.clone())
        .await
        .unwrap();
    assert_eq!(filenames(&files), vec!["a.srt"]);

    let dest = extractor.last_dest().unwrap();
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_extract_subtitles_removes_temporary_directory_on_failure() {
    let extractor = Arc::new(MockExtractor::with_files(&[("notes.txt", "hola")]));

    extract_subtitles(b"archive", "http://x.test/1.zip", extractor.clone())
        .await
        .unwrap_err();

    let dest = extractor.last_dest().unwrap();
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_extract_subtitles_cancelled_caller_leaves_no_temporary_directory() {
    let extractor = Arc::new(
        MockExtractor::with_files(&[("a.srt", "hola")]).with_delay(Duration::from_millis(300)),
    );

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        extract_subtitles(b"archive", "http://x.test/1.zip", extractor.clone()),
    )
    .await;
    assert!(outcome.is_err(), "extraction should still be running");

    // The blocking extractor keeps going after the caller gives up
    for _ in 0..200 {
        if extractor.completed() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(extractor.completed(), 1);

    let dest = extractor.last_dest().unwrap();
    for _ in 0..200 {
        if !dest.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!dest.exists(), "{dest:?} left behind after cancellation");
}
