//! Crash recovery
//!
//! Tests for unfinished packages, partial writes, and interrupted creation.
//! An unfinished package must be rejected, never partially repaired.

use blobpack_rs::{CompressionAlgorithm, PackError, PackageReader, PackageWriter};
use std::fs::OpenOptions;
use tempfile::NamedTempFile;

/// Helper: Truncate file to specified size
fn truncate_file(path: &std::path::Path, new_size: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(new_size).unwrap();
}

/// Helper: Create complete package for testing
fn create_complete_package() -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    let mut writer = PackageWriter::<()>::create(path).unwrap();
    for i in 0..10u32 {
        let data = format!("data{}", i).repeat(20);
        let compression = if i % 2 == 0 {
            CompressionAlgorithm::None
        } else {
            CompressionAlgorithm::Zstd
        };
        writer.write_entry(i, data.as_bytes(), compression).unwrap();
    }
    writer.close().unwrap();

    temp_file
}

#[test]
fn test_close_not_called() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    // Add entries but drop the writer without close()
    {
        let mut writer = PackageWriter::<()>::create(path).unwrap();
        writer.write_entry(0, b"data1", CompressionAlgorithm::None).unwrap();
        writer.write_entry(1, b"data2", CompressionAlgorithm::Zstd).unwrap();
    }

    // The placeholder header still claims zero entries with a live chain
    let result = PackageReader::<()>::open(path);
    assert!(
        matches!(result, Err(PackError::InterruptedWrite)),
        "Unfinished package should be rejected as interrupted"
    );
}

#[test]
fn test_close_not_called_without_entries() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    {
        let _writer = PackageWriter::<()>::create(path).unwrap();
    }

    let result = PackageReader::<()>::open(path);
    assert!(matches!(result, Err(PackError::InterruptedWrite)));
}

#[test]
fn test_partial_write_truncated() {
    for percent in [10u64, 30, 50, 70, 90, 99] {
        let temp_file = create_complete_package();
        let path = temp_file.path();

        let original_size = std::fs::metadata(path).unwrap().len();
        truncate_file(path, original_size * percent / 100);

        let result = PackageReader::<()>::open(path);
        assert!(
            result.is_err(),
            "Package truncated at {}% should fail to open",
            percent
        );
    }
}

#[test]
fn test_complete_package_opens() {
    let temp_file = create_complete_package();
    let reader = PackageReader::<()>::open(temp_file.path()).unwrap();

    assert_eq!(reader.entry_count(), 10);
    for i in 0..10u32 {
        let expected = format!("data{}", i).repeat(20);
        assert_eq!(reader.read(i).unwrap(), expected.as_bytes());
    }
}

#[test]
fn test_rewrite_after_failed_session() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    {
        let mut writer = PackageWriter::<()>::create(path).unwrap();
        writer.write_entry(0, b"abandoned", CompressionAlgorithm::None).unwrap();
    }
    assert!(PackageReader::<()>::open(path).is_err());

    // Re-running the producer replaces the broken output
    {
        let mut writer = PackageWriter::<()>::create(path).unwrap();
        writer.write_entry(0, b"fresh", CompressionAlgorithm::None).unwrap();
        writer.close().unwrap();
    }

    let reader = PackageReader::<()>::open(path).unwrap();
    assert_eq!(reader.read(0).unwrap(), b"fresh");
}
