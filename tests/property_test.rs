//! Property-based tests for write/read behavior

use blobpack_rs::{checksum, CompressionAlgorithm, PackageReader, PackageWriter};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::NamedTempFile;

fn write_package(
    entries: &[(u32, Vec<u8>, u64)],
    compression: CompressionAlgorithm,
) -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();
    let mut writer = PackageWriter::<u64>::create(temp_file.path())
        .unwrap()
        .with_zstd_level(3)
        .unwrap();
    for (index, data, meta) in entries {
        writer
            .write_entry_with_metadata(*index, data, compression, *meta)
            .unwrap();
    }
    writer.close().unwrap();
    temp_file
}

fn entries_strategy() -> impl Strategy<Value = BTreeMap<u32, (Vec<u8>, u64)>> {
    btree_map(0u32..300, (vec(any::<u8>(), 0..600), any::<u64>()), 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn roundtrip_matches_input(
        entries in entries_strategy(),
        use_zstd in any::<bool>(),
    ) {
        let compression = if use_zstd {
            CompressionAlgorithm::Zstd
        } else {
            CompressionAlgorithm::None
        };
        let list: Vec<_> = entries
            .iter()
            .map(|(i, (d, m))| (*i, d.clone(), *m))
            .collect();

        let temp_file = write_package(&list, compression);
        let reader = PackageReader::<u64>::open(temp_file.path()).unwrap();

        let written = list.iter().filter(|(_, d, _)| !d.is_empty()).count();
        prop_assert_eq!(reader.entry_count(), written);

        let max_index = list.iter().map(|(i, _, _)| *i).max().unwrap_or(0);
        for index in 0..=max_index + 2 {
            match entries.get(&index) {
                Some((data, meta)) if !data.is_empty() => {
                    prop_assert_eq!(&reader.read(index).unwrap(), data);
                    prop_assert_eq!(reader.metadata(index), *meta);
                }
                _ => {
                    // Holes, empty writes and out-of-range indices all read empty
                    prop_assert!(reader.read(index).unwrap().is_empty());
                    prop_assert_eq!(reader.metadata(index), 0u64);
                }
            }
        }
    }

    #[test]
    fn write_order_is_irrelevant(entries in entries_strategy()) {
        let forward: Vec<_> = entries
            .iter()
            .map(|(i, (d, m))| (*i, d.clone(), *m))
            .collect();
        let mut backward = forward.clone();
        backward.reverse();

        let forward_file = write_package(&forward, CompressionAlgorithm::Zstd);
        let backward_file = write_package(&backward, CompressionAlgorithm::Zstd);
        let a = PackageReader::<u64>::open(forward_file.path()).unwrap();
        let b = PackageReader::<u64>::open(backward_file.path()).unwrap();

        prop_assert_eq!(a.table_len(), b.table_len());
        prop_assert_eq!(a.indices().collect::<Vec<_>>(), b.indices().collect::<Vec<_>>());
        for index in a.indices() {
            prop_assert_eq!(a.read(index).unwrap(), b.read(index).unwrap());
            prop_assert_eq!(a.metadata(index), b.metadata(index));
        }
    }

    #[test]
    fn checksum_is_deterministic(data in vec(any::<u8>(), 0..4096)) {
        let copy = data.clone();
        prop_assert_eq!(checksum(&data), checksum(&copy));
    }
}
