use crate::archive::codec::compress_zstd;
use crate::archive::format::{
    CompressionAlgorithm, FileHeader, PackageHeader, FIRST_HEADER_FIELD_OFFSET,
    NEXT_HEADER_FIELD_OFFSET, PACKAGE_HEADER_SIZE,
};
use crate::checksum::checksum;
use crate::config::WriterConfig;
use crate::error::{PackError, Result};
use crate::record::FixedRecord;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, info, warn};

/// Package writer
///
/// Appends `header + blob` pairs in call order and threads them into a
/// singly linked chain: each new header's address is patched into the
/// previous forward pointer (the package header's `first_header_address`
/// for the first entry). The package header is rewritten with the final
/// count on [`close`](Self::close).
///
/// One writer per output; the seek-and-patch protocol is strictly sequential.
pub struct PackageWriter<M = (), W = BufWriter<File>>
where
    W: Write + Seek,
{
    sink: Option<W>,
    header: PackageHeader,
    /// File offset of the forward pointer the next entry must patch
    link_field: u64,
    current_offset: u64,
    config: WriterConfig,
    _metadata: PhantomData<M>,
}

impl<M: FixedRecord> PackageWriter<M, BufWriter<File>> {
    /// Create a new package file, truncating any existing one
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<M: FixedRecord, W: Write + Seek> PackageWriter<M, W> {
    /// Start a package on an empty sink
    pub fn new(mut sink: W) -> Result<Self> {
        // Placeholder header (rewritten on close)
        let header = PackageHeader::placeholder();
        sink.seek(SeekFrom::Start(0))?;
        header.write_to(&mut sink)?;

        Ok(Self {
            sink: Some(sink),
            header,
            link_field: FIRST_HEADER_FIELD_OFFSET,
            current_offset: PACKAGE_HEADER_SIZE as u64,
            config: WriterConfig::default(),
            _metadata: PhantomData,
        })
    }

    /// Replace the writer settings
    pub fn with_config(mut self, config: WriterConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Shorthand for overriding only the zstd level
    pub fn with_zstd_level(self, level: i32) -> Result<Self> {
        let config = WriterConfig {
            zstd_level: level,
            ..self.config.clone()
        };
        self.with_config(config)
    }

    /// Shorthand for overriding only the largest accepted index
    pub fn with_max_index(self, max_index: u32) -> Result<Self> {
        let config = WriterConfig {
            max_index,
            ..self.config.clone()
        };
        self.with_config(config)
    }

    /// Number of entries written so far
    pub fn file_count(&self) -> i32 {
        self.header.file_count
    }

    /// Offset the next header will be written at
    pub fn position(&self) -> u64 {
        self.current_offset
    }

    /// Add an entry with default metadata
    pub fn write_entry(
        &mut self,
        index: u32,
        data: &[u8],
        compression: CompressionAlgorithm,
    ) -> Result<()> {
        self.write_entry_with_metadata(index, data, compression, M::default())
    }

    /// Add an entry using an on-disk compression tag
    ///
    /// Unknown tags fail with [`PackError::UnsupportedCompression`] before
    /// anything is written.
    pub fn write_entry_raw(&mut self, index: u32, data: &[u8], tag: i32, metadata: M) -> Result<()> {
        let compression = CompressionAlgorithm::from_i32(tag)?;
        self.write_entry_with_metadata(index, data, compression, metadata)
    }

    /// Add an entry
    ///
    /// Empty `data` is skipped entirely: nothing is written, the count is
    /// unchanged and `index` reads back as a hole.
    pub fn write_entry_with_metadata(
        &mut self,
        index: u32,
        data: &[u8],
        compression: CompressionAlgorithm,
        metadata: M,
    ) -> Result<()> {
        if data.is_empty() {
            debug!(index, "skipping empty entry");
            return Ok(());
        }

        if index > self.config.max_index {
            return Err(PackError::InvalidIndex {
                index,
                max: self.config.max_index,
            });
        }

        let payload: Cow<'_, [u8]> = match compression {
            CompressionAlgorithm::None => Cow::Borrowed(data),
            CompressionAlgorithm::Zstd => Cow::Owned(compress_zstd(data, self.config.zstd_level)?),
        };

        let header_address = self.current_offset;
        let end = header_address + (FileHeader::<M>::SIZE + payload.len()) as u64;
        if end > i32::MAX as u64 {
            return Err(PackError::PackageTooLarge(end));
        }

        let file_header = FileHeader {
            index: index as i32,
            next_header_address: 0,
            compression,
            compressed_size: payload.len() as i32,
            uncompressed_size: data.len() as i32,
            content_hash: checksum(data),
            metadata,
        };

        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| PackError::InvalidFormat("Writer already closed".to_string()))?;

        // Point the previous link at this header, then return to the end
        sink.seek(SeekFrom::Start(self.link_field))?;
        sink.write_all(&(header_address as i32).to_le_bytes())?;
        sink.seek(SeekFrom::Start(header_address))?;

        file_header.write_to(&mut *sink)?;
        sink.write_all(&payload)?;

        self.link_field = header_address + NEXT_HEADER_FIELD_OFFSET;
        self.current_offset = end;
        self.header.file_count += 1;

        debug!(
            index,
            address = header_address,
            compression = compression.name(),
            uncompressed = data.len(),
            stored = payload.len(),
            "wrote entry"
        );

        Ok(())
    }

    /// Finalize the package header and hand back the sink
    pub fn close(mut self) -> Result<W> {
        let mut sink = self
            .sink
            .take()
            .ok_or_else(|| PackError::InvalidFormat("Writer already closed".to_string()))?;

        if self.header.file_count == 0 {
            self.header.first_header_address = 0;
        }

        sink.seek(SeekFrom::Start(0))?;
        self.header.write_to(&mut sink)?;
        sink.seek(SeekFrom::Start(self.current_offset))?;
        sink.flush()?;

        info!(
            file_count = self.header.file_count,
            size = self.current_offset,
            "package closed"
        );

        Ok(sink)
    }
}

impl<M, W: Write + Seek> Drop for PackageWriter<M, W> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            warn!(
                file_count = self.header.file_count,
                "package writer dropped without close; output is incomplete"
            );
        }
    }
}
