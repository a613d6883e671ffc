//! Disk geometry and presentation configuration
//!
//! Configuration is an input to [`Disk::init`](crate::core::disk::Disk::init),
//! never baked into the allocation engine. Values can come from code, the
//! [`DiskBuilder`](crate::DiskBuilder), or a TOML file:
//!
//! ```toml
//! total_sectors = 64
//! sector_size = 8
//! palette_size = 8
//! none_label = "Nenhum"
//! ```

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Default sector count of the reference disk
pub const DEFAULT_TOTAL_SECTORS: usize = 28;

/// Default sector size (3 data bytes + 1 pointer byte)
pub const DEFAULT_SECTOR_SIZE: usize = 4;

/// Number of distinct file colors a renderer cycles through
pub const DEFAULT_PALETTE_SIZE: usize = 8;

/// Rendered when no sector is free
pub const DEFAULT_NONE_LABEL: &str = "none";

/// Validated disk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DiskConfig {
    /// Number of sectors on the disk
    #[validate(range(min = 1))]
    pub total_sectors: usize,

    /// Bytes per sector, including the pointer byte
    #[validate(range(min = 2))]
    pub sector_size: usize,

    /// Size of the caller's color palette (for `FileSummary::color_index`)
    #[validate(range(min = 1))]
    pub palette_size: usize,

    /// Sentinel returned by range formatting when there is nothing to list
    #[validate(length(min = 1))]
    pub none_label: String,
}

impl DiskConfig {
    /// Configuration with the given geometry and default presentation settings
    pub fn new(total_sectors: usize, sector_size: usize) -> Self {
        DiskConfig {
            total_sectors,
            sector_size,
            ..Default::default()
        }
    }

    /// Payload capacity of a single sector
    pub fn data_bytes_per_sector(&self) -> usize {
        self.sector_size.saturating_sub(1)
    }

    /// Check all constraints
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when any field is out of range.
    pub fn validate_geometry(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take default values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: DiskConfig = toml::from_str(source)?;
        config.validate_geometry()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

impl Default for DiskConfig {
    fn default() -> Self {
        DiskConfig {
            total_sectors: DEFAULT_TOTAL_SECTORS,
            sector_size: DEFAULT_SECTOR_SIZE,
            palette_size: DEFAULT_PALETTE_SIZE,
            none_label: DEFAULT_NONE_LABEL.to_string(),
        }
    }
}
