//! Human- and machine-readable description of an opened package

use crate::archive::reader::PackageReader;
use crate::error::Result;
use crate::record::FixedRecord;
use serde::{Deserialize, Serialize};

/// Inventory of a package as seen by the reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub version: u8,
    pub entry_count: usize,
    pub table_len: usize,
    /// Indices below `table_len` with no content
    pub holes: usize,
    pub total_compressed: u64,
    pub total_uncompressed: u64,
    pub entries: Vec<EntrySummary>,
}

/// One present index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub index: u32,
    pub compression: String,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub content_hash: u32,
}

impl PackageSummary {
    pub fn from_reader<M: FixedRecord>(reader: &PackageReader<M>) -> Self {
        let entries: Vec<EntrySummary> = reader
            .table()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_present())
            .map(|(index, entry)| EntrySummary {
                index: index as u32,
                compression: entry.compression.name().to_string(),
                compressed_size: entry.compressed_size as u32,
                uncompressed_size: entry.uncompressed_size as u32,
                content_hash: entry.content_hash,
            })
            .collect();

        Self {
            version: reader.header().version,
            entry_count: reader.entry_count(),
            table_len: reader.table_len(),
            holes: reader.table_len() - entries.len(),
            total_compressed: entries.iter().map(|e| e.compressed_size as u64).sum(),
            total_uncompressed: entries.iter().map(|e| e.uncompressed_size as u64).sum(),
            entries,
        }
    }

    /// Compression ratio of stored bytes to original bytes (1.0 for empty packages)
    pub fn ratio(&self) -> f64 {
        if self.total_uncompressed == 0 {
            return 1.0;
        }
        self.total_compressed as f64 / self.total_uncompressed as f64
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<M: FixedRecord> PackageReader<M> {
    /// Summarize the opened package
    pub fn summary(&self) -> PackageSummary {
        PackageSummary::from_reader(self)
    }
}
