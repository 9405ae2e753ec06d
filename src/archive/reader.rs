use crate::archive::codec::{decompress_zstd, decompress_zstd_into};
use crate::archive::format::{
    CompressionAlgorithm, FileHeader, PackageHeader, ResolvedEntry, PACKAGE_HEADER_SIZE,
};
use crate::checksum::checksum;
use crate::config::{ReaderConfig, DEFAULT_STACK_BUFFER_LIMIT};
use crate::error::{PackError, Result};
use crate::record::{decode_slice, FixedRecord};
use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Memory-mapped package reader with O(1) lookup by index
///
/// The header chain is walked once in [`open`](Self::open) and turned into a
/// dense table indexed by entry index. After that the reader is immutable:
/// every read takes `&self` and may run from many threads at once.
///
/// Indices that were never written (holes), including any index past the
/// largest one written, read back as empty bytes and default metadata.
pub struct PackageReader<M = ()> {
    map: Mmap,
    header: PackageHeader,
    entries: Vec<ResolvedEntry<M>>,
    entry_count: usize,
    config: ReaderConfig,
}

impl<M: FixedRecord> PackageReader<M> {
    /// Open a package with default settings
    ///
    /// An entry with an unknown compression tag fails the whole open with
    /// [`PackError::UnsupportedCompression`], not just reads of that index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open a package, walk its header chain and build the index table
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self> {
        config.validate()?;

        let file = File::open(path)?;
        // SAFETY: a finished package is never modified while it is mapped.
        let map = unsafe { Mmap::map(&file)? };

        let header = read_package_header(&map)?;
        let chain = walk_chain::<M>(&map, &header)?;
        let entry_count = chain.len();
        let entries = resolve_table(chain, config.max_table_len)?;

        debug!(
            entry_count,
            table_len = entries.len(),
            size = map.len(),
            "opened package"
        );

        Ok(Self {
            map,
            header,
            entries,
            entry_count,
            config,
        })
    }

    /// Enable or disable checksum verification on reads
    pub fn with_checksum_verification(mut self, verify: bool) -> Self {
        self.config.verify_checksums = verify;
        self
    }

    /// Get package header information
    pub fn header(&self) -> &PackageHeader {
        &self.header
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Number of entries stored on disk
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Length of the index table: largest written index + 1, or 0 when empty
    pub fn table_len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether `index` holds content
    pub fn contains(&self, index: u32) -> bool {
        self.entry(index).is_some()
    }

    /// Location and sizes of a present entry
    pub fn entry(&self, index: u32) -> Option<&ResolvedEntry<M>> {
        self.entries
            .get(index as usize)
            .filter(|entry| entry.is_present())
    }

    /// Indices that hold content, ascending
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_present())
            .map(|(index, _)| index as u32)
    }

    /// Metadata stored with `index`, or `M::default()` for a hole
    pub fn metadata(&self, index: u32) -> M {
        self.entries
            .get(index as usize)
            .map(|entry| entry.metadata)
            .unwrap_or_default()
    }

    /// Read and decompress an entry into a new buffer
    pub fn read(&self, index: u32) -> Result<Vec<u8>> {
        let Some(entry) = self.entry(index) else {
            return Ok(Vec::new());
        };

        let stored = self.stored_bytes(index, entry)?;
        let data = match entry.compression {
            CompressionAlgorithm::None => stored.to_vec(),
            CompressionAlgorithm::Zstd => decompress_zstd(stored, entry.uncompressed_size as usize)?,
        };

        self.verify(index, entry, &data)?;
        Ok(data)
    }

    /// Read an entry into `dest`, returning the number of bytes written
    ///
    /// `dest` must hold at least the entry's uncompressed size. A hole
    /// writes nothing and returns 0.
    pub fn read_into(&self, index: u32, dest: &mut [u8]) -> Result<usize> {
        let Some(entry) = self.entry(index) else {
            return Ok(0);
        };

        let len = entry.uncompressed_size as usize;
        if dest.len() < len {
            return Err(PackError::BufferTooSmall {
                needed: len,
                available: dest.len(),
            });
        }

        let stored = self.stored_bytes(index, entry)?;
        let dest = &mut dest[..len];
        match entry.compression {
            CompressionAlgorithm::None => dest.copy_from_slice(stored),
            CompressionAlgorithm::Zstd => decompress_zstd_into(stored, dest)?,
        }

        self.verify(index, entry, dest)?;
        Ok(len)
    }

    /// Read an entry, borrowing straight from the mapping when it is stored raw
    ///
    /// Uncompressed entries come back as `Cow::Borrowed` views into the
    /// mapped file; zstd entries are decompressed into an owned buffer.
    pub fn read_span(&self, index: u32) -> Result<Cow<'_, [u8]>> {
        let Some(entry) = self.entry(index) else {
            return Ok(Cow::Borrowed(&[]));
        };

        match entry.compression {
            CompressionAlgorithm::None => {
                let stored = self.stored_bytes(index, entry)?;
                self.verify(index, entry, stored)?;
                Ok(Cow::Borrowed(stored))
            }
            CompressionAlgorithm::Zstd => self.read(index).map(Cow::Owned),
        }
    }

    /// Run `f` over an entry's bytes without keeping a copy
    ///
    /// Small zstd entries are decompressed into a stack buffer, larger ones
    /// onto the heap; raw entries are handed over straight from the mapping.
    pub fn with_entry<R>(&self, index: u32, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let Some(entry) = self.entry(index) else {
            return Ok(f(&[]));
        };

        let stored = self.stored_bytes(index, entry)?;
        let len = entry.uncompressed_size as usize;

        match entry.compression {
            CompressionAlgorithm::None => {
                self.verify(index, entry, stored)?;
                Ok(f(stored))
            }
            CompressionAlgorithm::Zstd if len <= self.config.stack_buffer_limit => {
                let mut scratch = [0u8; DEFAULT_STACK_BUFFER_LIMIT];
                let out = &mut scratch[..len];
                decompress_zstd_into(stored, out)?;
                self.verify(index, entry, out)?;
                Ok(f(out))
            }
            CompressionAlgorithm::Zstd => {
                let data = decompress_zstd(stored, len)?;
                self.verify(index, entry, &data)?;
                Ok(f(&data))
            }
        }
    }

    /// Read an entry as a packed array of fixed-size records
    pub fn read_array<T: FixedRecord>(&self, index: u32) -> Result<Vec<T>> {
        self.with_entry(index, |bytes| {
            decode_slice::<T>(bytes).ok_or_else(|| {
                PackError::InvalidFormat(format!(
                    "Entry {} is {} bytes, not a multiple of the {}-byte record size",
                    index,
                    bytes.len(),
                    T::SIZE
                ))
            })
        })?
    }

    /// Release the mapping
    ///
    /// Views returned by [`read_span`](Self::read_span) borrow the reader and
    /// must be dropped first.
    pub fn close(self) {
        debug!(entry_count = self.entry_count, "closed package");
    }

    pub(crate) fn table(&self) -> &[ResolvedEntry<M>] {
        &self.entries
    }

    fn stored_bytes(&self, index: u32, entry: &ResolvedEntry<M>) -> Result<&[u8]> {
        let start = entry.content_address as usize;
        let end = start + entry.compressed_size as usize;
        self.map.get(start..end).ok_or_else(|| {
            PackError::InvalidFormat(format!("Entry {} content lies outside the package", index))
        })
    }

    fn verify(&self, index: u32, entry: &ResolvedEntry<M>, data: &[u8]) -> Result<()> {
        if !self.config.verify_checksums {
            return Ok(());
        }

        let actual = checksum(data);
        if actual != entry.content_hash {
            return Err(PackError::ChecksumMismatch {
                index,
                expected: entry.content_hash,
                actual,
            });
        }
        Ok(())
    }
}

fn read_package_header(map: &[u8]) -> Result<PackageHeader> {
    if map.len() < PACKAGE_HEADER_SIZE {
        return Err(PackError::InvalidFormat(format!(
            "File is {} bytes, smaller than the {}-byte package header",
            map.len(),
            PACKAGE_HEADER_SIZE
        )));
    }

    let header = PackageHeader::read_from(&map[..PACKAGE_HEADER_SIZE])?;
    header.validate_version()?;

    if header.file_count < 0 {
        return Err(PackError::InvalidFormat(format!(
            "Negative file count: {}",
            header.file_count
        )));
    }

    if header.is_unfinished() {
        return Err(PackError::InterruptedWrite);
    }

    Ok(header)
}

/// Follow the header chain from the package header, bounded by its file count
///
/// Returns every header with the address of the content that follows it,
/// in chain (write) order.
fn walk_chain<M: FixedRecord>(
    map: &[u8],
    header: &PackageHeader,
) -> Result<Vec<(FileHeader<M>, i32)>> {
    let expected = header.file_count as usize;
    if expected == 0 {
        return Ok(Vec::new());
    }

    if header.first_header_address == 0 {
        return Err(PackError::chain(
            0,
            format!("Package declares {} entries but the chain is empty", expected),
        ));
    }

    let header_size = FileHeader::<M>::SIZE;
    let mut chain = Vec::with_capacity(expected.min(map.len() / header_size));
    let mut address = header.first_header_address;

    while address != 0 {
        if chain.len() == expected {
            return Err(PackError::chain(
                address,
                format!("Chain continues past the declared {} entries", expected),
            ));
        }

        if (address as i64) < PACKAGE_HEADER_SIZE as i64 {
            return Err(PackError::chain(address, "Header address overlaps the package header"));
        }

        let start = address as usize;
        let content_start = start + header_size;
        let raw = map
            .get(start..content_start)
            .ok_or_else(|| PackError::chain(address, "Header extends past end of file"))?;
        let file_header = FileHeader::<M>::read_from(raw)?;

        if file_header.index < 0 {
            return Err(PackError::chain(
                address,
                format!("Negative entry index {}", file_header.index),
            ));
        }

        if file_header.compressed_size < 0 || file_header.uncompressed_size < 0 {
            return Err(PackError::chain(address, "Negative content size"));
        }

        if file_header.compression == CompressionAlgorithm::None
            && file_header.compressed_size != file_header.uncompressed_size
        {
            return Err(PackError::chain(
                address,
                "Uncompressed entry has differing stored and original sizes",
            ));
        }

        if content_start + file_header.compressed_size as usize > map.len() {
            return Err(PackError::chain(address, "Content extends past end of file"));
        }

        let content_address = i32::try_from(content_start)
            .map_err(|_| PackError::chain(address, "Content address exceeds 32-bit range"))?;

        chain.push((file_header, content_address));
        address = file_header.next_header_address;
    }

    if chain.len() != expected {
        return Err(PackError::chain(
            0,
            format!(
                "Chain ended after {} of {} declared entries",
                chain.len(),
                expected
            ),
        ));
    }

    Ok(chain)
}

/// Turn the chain into a dense table indexed by entry index
///
/// Duplicate indices resolve to the entry written last.
fn resolve_table<M: FixedRecord>(
    mut chain: Vec<(FileHeader<M>, i32)>,
    max_len: usize,
) -> Result<Vec<ResolvedEntry<M>>> {
    // Stable: equal indices keep their write order
    chain.sort_by_key(|(header, _)| header.index);

    let Some((last, _)) = chain.last() else {
        return Ok(Vec::new());
    };
    let len = last.index as usize + 1;
    if len > max_len {
        return Err(PackError::InvalidFormat(format!(
            "Largest index {} needs a table of {} entries (limit {})",
            last.index, len, max_len
        )));
    }

    let mut table = Vec::new();
    table.try_reserve_exact(len).map_err(|_| {
        PackError::InvalidFormat(format!("Cannot allocate index table of {} entries", len))
    })?;
    table.resize(len, ResolvedEntry::absent());

    for (header, content_address) in &chain {
        let slot = &mut table[header.index as usize];
        if slot.is_present() {
            warn!(index = header.index, "duplicate entry index, keeping the later write");
        }
        *slot = ResolvedEntry::from_header(header, *content_address);
    }

    Ok(table)
}
