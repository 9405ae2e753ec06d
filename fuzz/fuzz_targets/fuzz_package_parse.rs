#![no_main]

use blobpack_rs::{Dimensions, PackageReader};
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Skip inputs smaller than the package header
    if data.len() < 9 {
        return;
    }

    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };

    if temp_file.write_all(data).is_err() {
        return;
    }

    if temp_file.flush().is_err() {
        return;
    }

    // Opening walks the whole chain - should never panic or loop
    let reader = match PackageReader::<Dimensions>::open(temp_file.path()) {
        Ok(r) => r,
        Err(_) => return, // Expected for invalid data
    };

    // Every present index, plus a few holes and out-of-range indices
    let indices: Vec<u32> = reader.indices().collect();
    for index in indices.iter().copied().chain([0, 1, 1000, u32::MAX]) {
        let _ = reader.read(index);
        let _ = reader.read_span(index);
        let _ = reader.read_array::<u32>(index);
        let _ = reader.with_entry(index, |bytes| bytes.len());
        let _ = reader.metadata(index);
    }

    let _ = reader.summary().to_json();
});
