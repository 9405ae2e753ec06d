mod codec;
mod format;
mod reader;
mod summary;
mod writer;

pub use codec::{compress_zstd, decompress_zstd, decompress_zstd_into};
pub use format::{
    CompressionAlgorithm, FileHeader, PackageHeader, ResolvedEntry, FILE_HEADER_PREFIX_SIZE,
    FIRST_HEADER_FIELD_OFFSET, FORMAT_VERSION, NEXT_HEADER_FIELD_OFFSET, PACKAGE_HEADER_SIZE,
};
pub use reader::PackageReader;
pub use summary::{EntrySummary, PackageSummary};
pub use writer::PackageWriter;
