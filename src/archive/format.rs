use crate::error::{PackError, Result};
use crate::record::FixedRecord;
use std::io::{Read, Write};

/// Current on-disk format version
pub const FORMAT_VERSION: u8 = 1;

/// Package header size in bytes: version (1) + file count (4) + first header address (4)
pub const PACKAGE_HEADER_SIZE: usize = 9;

/// Offset of `first_header_address` inside the package header
pub const FIRST_HEADER_FIELD_OFFSET: u64 = 5;

/// Fixed prefix of every file header, before the caller metadata
pub const FILE_HEADER_PREFIX_SIZE: usize = 24;

/// Offset of `next_header_address` inside a file header
pub const NEXT_HEADER_FIELD_OFFSET: u64 = 4;

/// Compression applied to a content blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CompressionAlgorithm {
    None = 0,
    Zstd = 1,
}

impl CompressionAlgorithm {
    pub fn from_i32(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Zstd),
            _ => Err(PackError::UnsupportedCompression(value)),
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zstd => "zstd",
        }
    }
}

/// Header at offset 0 of every package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageHeader {
    pub version: u8,
    pub file_count: i32,
    pub first_header_address: i32,
}

impl PackageHeader {
    /// Placeholder written when a package is opened for writing
    pub fn placeholder() -> Self {
        Self {
            version: FORMAT_VERSION,
            file_count: 0,
            first_header_address: PACKAGE_HEADER_SIZE as i32,
        }
    }

    /// Write header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&[self.version])?;
        writer.write_all(&self.file_count.to_le_bytes())?;
        writer.write_all(&self.first_header_address.to_le_bytes())?;
        Ok(())
    }

    /// Read header from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut version = [0u8; 1];
        reader.read_exact(&mut version)?;

        let file_count = read_i32(&mut reader)?;
        let first_header_address = read_i32(&mut reader)?;

        Ok(Self {
            version: version[0],
            file_count,
            first_header_address,
        })
    }

    /// Validate version compatibility
    pub fn validate_version(&self) -> Result<()> {
        if self.version == 0 || self.version > FORMAT_VERSION {
            return Err(PackError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// True for a header the writer never finalized
    ///
    /// A closed empty package stores `first_header_address == 0`; the
    /// placeholder points past itself with a zero count.
    pub fn is_unfinished(&self) -> bool {
        self.file_count == 0 && self.first_header_address != 0
    }
}

/// Per-entry header preceding each content blob
///
/// Layout (little-endian, no padding):
/// - Index: i32
/// - Next Header Address: i32 (0 terminates the chain)
/// - Compression Algorithm: i32
/// - Compressed Size: i32
/// - Uncompressed Size: i32
/// - Content Hash: u32
/// - Metadata: `M::SIZE` bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileHeader<M> {
    pub index: i32,
    pub next_header_address: i32,
    pub compression: CompressionAlgorithm,
    pub compressed_size: i32,
    pub uncompressed_size: i32,
    pub content_hash: u32,
    pub metadata: M,
}

impl<M: FixedRecord> FileHeader<M> {
    /// Total encoded size for this metadata type
    pub const SIZE: usize = FILE_HEADER_PREFIX_SIZE + M::SIZE;

    /// Write header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let mut buf = vec![0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.index.to_le_bytes());
        buf[4..8].copy_from_slice(&self.next_header_address.to_le_bytes());
        buf[8..12].copy_from_slice(&self.compression.as_i32().to_le_bytes());
        buf[12..16].copy_from_slice(&self.compressed_size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.uncompressed_size.to_le_bytes());
        buf[20..24].copy_from_slice(&self.content_hash.to_le_bytes());
        self.metadata.encode(&mut buf[FILE_HEADER_PREFIX_SIZE..]);

        writer.write_all(&buf)?;
        Ok(())
    }

    /// Read header from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let index = read_i32(&mut reader)?;
        let next_header_address = read_i32(&mut reader)?;
        let compression = CompressionAlgorithm::from_i32(read_i32(&mut reader)?)?;
        let compressed_size = read_i32(&mut reader)?;
        let uncompressed_size = read_i32(&mut reader)?;
        let content_hash = read_u32(&mut reader)?;

        let mut metadata = vec![0u8; M::SIZE];
        reader.read_exact(&mut metadata)?;

        Ok(Self {
            index,
            next_header_address,
            compression,
            compressed_size,
            uncompressed_size,
            content_hash,
            metadata: M::decode(&metadata),
        })
    }
}

/// Read-time view of one index: where its blob lives and how to decode it
///
/// `content_address == 0` marks a hole. Offset 0 always holds the package
/// header, so no blob can start there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEntry<M> {
    pub content_address: i32,
    pub compressed_size: i32,
    pub uncompressed_size: i32,
    pub compression: CompressionAlgorithm,
    pub content_hash: u32,
    pub metadata: M,
}

impl<M: FixedRecord> ResolvedEntry<M> {
    /// The absent sentinel
    pub fn absent() -> Self {
        Self {
            content_address: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            compression: CompressionAlgorithm::None,
            content_hash: 0,
            metadata: M::default(),
        }
    }

    pub(crate) fn from_header(header: &FileHeader<M>, content_address: i32) -> Self {
        Self {
            content_address,
            compressed_size: header.compressed_size,
            uncompressed_size: header.uncompressed_size,
            compression: header.compression,
            content_hash: header.content_hash,
            metadata: header.metadata,
        }
    }

    pub fn is_present(&self) -> bool {
        self.content_address != 0
    }
}

impl<M: FixedRecord> Default for ResolvedEntry<M> {
    fn default() -> Self {
        Self::absent()
    }
}

// Helper functions for reading primitive types
fn read_i32<R: Read>(mut reader: R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_u32<R: Read>(mut reader: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
