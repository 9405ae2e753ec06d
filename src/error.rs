use std::io;
use thiserror::Error;

/// Result type for package operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Unified error type for all package operations
#[derive(Debug, Error)]
pub enum PackError {
    // Format errors
    #[error("Invalid package format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported package version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unsupported compression algorithm: {0}")]
    UnsupportedCompression(i32),

    #[error("Malformed header chain at offset {address}: {reason}")]
    MalformedChain { address: i64, reason: String },

    #[error("Package was not closed by its writer (interrupted write)")]
    InterruptedWrite,

    #[error("Checksum mismatch for entry {index}: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        index: u32,
        expected: u32,
        actual: u32,
    },

    // Compression errors
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Destination buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    // Writer limits
    #[error("Invalid entry index: {index} (max {max})")]
    InvalidIndex { index: u32, max: u32 },

    #[error("Package too large: offset {0} does not fit the 32-bit format")]
    PackageTooLarge(u64),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PackError {
    pub(crate) fn chain(address: impl Into<i64>, reason: impl Into<String>) -> Self {
        PackError::MalformedChain {
            address: address.into(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for PackError {
    fn from(err: toml::de::Error) -> Self {
        PackError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PackError {
    fn from(err: toml::ser::Error) -> Self {
        PackError::Config(err.to_string())
    }
}
