//! Zero-length entries are never written and read back as holes

use blobpack_rs::{CompressionAlgorithm, Dimensions, PackageReader, PackageWriter};
use tempfile::NamedTempFile;

#[test]
fn test_zero_length_entry_is_a_hole() {
    let with_empty = NamedTempFile::new().unwrap();
    let without = NamedTempFile::new().unwrap();

    {
        let mut writer = PackageWriter::<Dimensions>::create(with_empty.path()).unwrap();
        writer
            .write_entry_with_metadata(0, b"", CompressionAlgorithm::None, Dimensions::new(9, 9))
            .unwrap();
        writer
            .write_entry(1, b"Hello, World!", CompressionAlgorithm::None)
            .unwrap();
        writer.write_entry(2, b"", CompressionAlgorithm::Zstd).unwrap();
        assert_eq!(writer.file_count(), 1);
        writer.close().unwrap();
    }

    {
        let mut writer = PackageWriter::<Dimensions>::create(without.path()).unwrap();
        writer
            .write_entry(1, b"Hello, World!", CompressionAlgorithm::None)
            .unwrap();
        writer.close().unwrap();
    }

    // Skipped writes leave no trace at all
    assert_eq!(
        std::fs::read(with_empty.path()).unwrap(),
        std::fs::read(without.path()).unwrap()
    );

    let reader = PackageReader::<Dimensions>::open(with_empty.path()).unwrap();
    assert_eq!(reader.entry_count(), 1);
    assert_eq!(reader.table_len(), 2);

    assert!(!reader.contains(0));
    assert!(reader.read(0).unwrap().is_empty());
    // Metadata given with an empty blob is dropped along with it
    assert_eq!(reader.metadata(0), Dimensions::default());

    assert!(!reader.contains(2));
    assert!(reader.read(2).unwrap().is_empty());

    assert_eq!(reader.read(1).unwrap(), b"Hello, World!");
}

#[test]
fn test_only_empty_entries_produce_empty_package() {
    let temp_file = NamedTempFile::new().unwrap();

    {
        let mut writer = PackageWriter::<()>::create(temp_file.path()).unwrap();
        for i in 0..5 {
            writer.write_entry(i, &[], CompressionAlgorithm::Zstd).unwrap();
        }
        writer.close().unwrap();
    }

    let reader = PackageReader::<()>::open(temp_file.path()).unwrap();
    assert_eq!(reader.entry_count(), 0);
    assert_eq!(reader.table_len(), 0);
    assert_eq!(reader.header().first_header_address, 0);
}
