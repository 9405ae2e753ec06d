//! Blobpack-rs: indexed blob package format
//!
//! A package is a single file holding many independently compressed byte
//! blobs, each addressed by a dense non-negative integer index and carrying a
//! small fixed-size metadata value:
//! - Append-only writer that threads a linked chain of entry headers
//! - Memory-mapped reader that rebuilds a dense index table at open
//! - Per-entry zstd compression and a content checksum
//! - Zero-copy reads for uncompressed entries
//!
//! # Example
//!
//! ```no_run
//! use blobpack_rs::{CompressionAlgorithm, Dimensions, PackageReader, PackageWriter};
//!
//! // Create a package
//! let mut writer = PackageWriter::<Dimensions>::create("textures.pak")?;
//! writer.write_entry_with_metadata(
//!     0,
//!     &[0xFF; 16],
//!     CompressionAlgorithm::Zstd,
//!     Dimensions::new(2, 2),
//! )?;
//! writer.close()?;
//!
//! // Read it back
//! let reader = PackageReader::<Dimensions>::open("textures.pak")?;
//! let pixels = reader.read(0)?;
//! let size = reader.metadata(0);
//! assert_eq!(pixels.len(), 16);
//! assert_eq!(size.width, 2);
//! # Ok::<(), blobpack_rs::PackError>(())
//! ```

pub mod archive;
pub mod checksum;
pub mod config;
pub mod error;
pub mod record;

// Re-export commonly used types
pub use archive::{
    CompressionAlgorithm, EntrySummary, FileHeader, PackageHeader, PackageReader,
    PackageSummary, PackageWriter, ResolvedEntry, FORMAT_VERSION, PACKAGE_HEADER_SIZE,
};
pub use checksum::{checksum, Checksum};
pub use config::{PackConfig, ReaderConfig, WriterConfig};
pub use error::{PackError, Result};
pub use record::{Dimensions, FixedRecord};
