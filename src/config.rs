//! Writer and reader settings
//!
//! Both structs deserialize from TOML so asset pipelines can keep them next
//! to the rest of their build configuration:
//!
//! ```toml
//! [writer]
//! zstd_level = 19
//! max_index = 65535
//!
//! [reader]
//! verify_checksums = false
//! max_table_len = 65536
//! ```

use crate::error::{PackError, Result};
use serde::{Deserialize, Serialize};

/// Default size of the on-stack scratch buffer used by scoped reads
pub const DEFAULT_STACK_BUFFER_LIMIT: usize = 4096;

/// Default cap on the index table built at open (largest index + 1)
pub const DEFAULT_MAX_TABLE_LEN: usize = 1 << 24;

/// Default largest index the writer accepts, the last slot of a default table
pub const DEFAULT_MAX_INDEX: u32 = DEFAULT_MAX_TABLE_LEN as u32 - 1;

/// Highest compression level supported by the linked zstd
pub fn max_zstd_level() -> i32 {
    *zstd::compression_level_range().end()
}

/// Settings for [`PackageWriter`](crate::PackageWriter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Level passed to zstd for `Zstd` entries
    pub zstd_level: i32,

    /// Largest entry index accepted by `write_entry`
    pub max_index: u32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            zstd_level: max_zstd_level(),
            max_index: DEFAULT_MAX_INDEX,
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> Result<()> {
        let range = zstd::compression_level_range();
        if !range.contains(&self.zstd_level) {
            return Err(PackError::Config(format!(
                "zstd_level {} outside {}..={}",
                self.zstd_level,
                range.start(),
                range.end()
            )));
        }
        if self.max_index > i32::MAX as u32 {
            return Err(PackError::Config(format!(
                "max_index {} exceeds the 32-bit on-disk index",
                self.max_index
            )));
        }
        Ok(())
    }
}

/// Settings for [`PackageReader`](crate::PackageReader)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Recompute each entry's checksum on read and fail on mismatch
    pub verify_checksums: bool,

    /// Zstd entries up to this many uncompressed bytes are decompressed on
    /// the stack by scoped reads
    pub stack_buffer_limit: usize,

    /// Packages whose largest index would need a longer table are rejected
    pub max_table_len: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            stack_buffer_limit: DEFAULT_STACK_BUFFER_LIMIT,
            max_table_len: DEFAULT_MAX_TABLE_LEN,
        }
    }
}

impl ReaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stack_buffer_limit > DEFAULT_STACK_BUFFER_LIMIT {
            return Err(PackError::Config(format!(
                "stack_buffer_limit {} exceeds {}",
                self.stack_buffer_limit, DEFAULT_STACK_BUFFER_LIMIT
            )));
        }
        if self.max_table_len == 0 {
            return Err(PackError::Config("max_table_len must be positive".to_string()));
        }
        Ok(())
    }
}

/// Combined settings file with optional `[writer]` and `[reader]` tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    pub writer: WriterConfig,
    pub reader: ReaderConfig,
}

impl PackConfig {
    /// Parse and validate a TOML settings document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: PackConfig = toml::from_str(input)?;
        config.writer.validate()?;
        config.reader.validate()?;
        config.check_compatible()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fail when the writer may produce indices the reader would refuse
    pub fn check_compatible(&self) -> Result<()> {
        if self.writer.max_index as usize >= self.reader.max_table_len {
            return Err(PackError::Config(format!(
                "writer max_index {} does not fit reader max_table_len {}",
                self.writer.max_index, self.reader.max_table_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PackConfig::default();
        assert_eq!(config.writer.zstd_level, max_zstd_level());
        assert!(config.reader.verify_checksums);
        assert_eq!(config.reader.stack_buffer_limit, DEFAULT_STACK_BUFFER_LIMIT);
        assert_eq!(config.writer.max_index as usize + 1, config.reader.max_table_len);
        assert!(config.check_compatible().is_ok());
    }

    #[test]
    fn test_rejects_writer_reader_mismatch() {
        let result = PackConfig::from_toml_str(
            r#"
            [writer]
            max_index = 1000

            [reader]
            max_table_len = 1000
            "#,
        );
        assert!(matches!(result, Err(PackError::Config(_))));

        let config = PackConfig::from_toml_str(
            "[writer]\nmax_index = 999\n[reader]\nmax_table_len = 1000\n",
        )
        .unwrap();
        assert_eq!(config.writer.max_index, 999);
    }

    #[test]
    fn test_rejects_index_beyond_format() {
        let result = PackConfig::from_toml_str(
            "[writer]\nmax_index = 3000000000\n[reader]\nmax_table_len = 4000000000\n",
        );
        assert!(matches!(result, Err(PackError::Config(_))));
    }

    #[test]
    fn test_partial_toml() {
        let config = PackConfig::from_toml_str(
            r#"
            [reader]
            verify_checksums = false
            "#,
        )
        .unwrap();

        assert!(!config.reader.verify_checksums);
        assert_eq!(config.writer, WriterConfig::default());
    }

    #[test]
    fn test_rejects_bad_level() {
        let result = PackConfig::from_toml_str("[writer]\nzstd_level = 1000\n");
        assert!(matches!(result, Err(PackError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_table_len() {
        let result = PackConfig::from_toml_str("[reader]\nmax_table_len = 0\n");
        assert!(matches!(result, Err(PackError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = PackConfig::from_toml_str("[writer\nzstd_level = ");
        assert!(matches!(result, Err(PackError::Config(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = PackConfig::default();
        config.writer.zstd_level = 3;
        let text = config.to_toml_string().unwrap();
        assert_eq!(PackConfig::from_toml_str(&text).unwrap(), config);
    }
}
