use crate::error::{PackError, Result};

/// Compress a whole blob with zstd at `level`
pub fn compress_zstd(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::bulk::compress(data, level)
        .map_err(|e| PackError::CompressionFailed(format!("Zstd compression failed: {}", e)))
}

/// Decompress a zstd blob whose uncompressed size is known in advance
pub fn decompress_zstd(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let output = zstd::bulk::decompress(data, expected_size)
        .map_err(|e| PackError::DecompressionFailed(format!("Zstd decompression failed: {}", e)))?;

    if output.len() != expected_size {
        return Err(size_mismatch(expected_size, output.len()));
    }

    Ok(output)
}

/// Decompress a zstd blob into `dest`, which must be exactly the uncompressed size
pub fn decompress_zstd_into(data: &[u8], dest: &mut [u8]) -> Result<()> {
    let written = zstd::bulk::decompress_to_buffer(data, dest)
        .map_err(|e| PackError::DecompressionFailed(format!("Zstd decompression failed: {}", e)))?;

    if written != dest.len() {
        return Err(size_mismatch(dest.len(), written));
    }

    Ok(())
}

fn size_mismatch(expected: usize, actual: usize) -> PackError {
    PackError::DecompressionFailed(format!(
        "Zstd decompression size mismatch: expected {}, got {}",
        expected, actual
    ))
}
