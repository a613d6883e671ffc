//! # Sector Chain - FAT-style Sector Allocation Simulator
//!
//! `sector-chain` models a small block device that stores named files in
//! fixed-size sectors linked into singly-linked chains:
//!
//! - **Fixed sectors**: `sector_size - 1` payload slots plus one pointer slot
//! - **Chains**: each sector points at the next one (1-based) or ends with `&`
//! - **First-fit ascending allocation** with an optional preferred start sector
//! - **Residual data**: removing a file only drops ownership, bytes stay behind
//! - **Free-space reporting**: free sector lists and compressed ranges
//!
//! Rendering (grids, tables, colors) is left to the caller, which drives the
//! disk through [`Disk`] or the thread-safe [`SharedDisk`].
//!
//! ## Quick Start
//!
//! ```rust
//! use sector_chain::{Disk, Result};
//!
//! # fn main() -> Result<()> {
//! let mut disk = Disk::default(); // 28 sectors of 4 bytes
//!
//! let file = disk.allocate("a.txt", "hello", None)?;
//! assert_eq!(file.sectors, vec![0, 1]);
//! assert_eq!(disk.free_ranges_label(), "3-28");
//!
//! disk.remove(file.id)?;
//! assert_eq!(disk.free_sector_ids().len(), 28);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Geometry
//!
//! ```rust
//! use sector_chain::{DiskBuilder, Result};
//!
//! # fn main() -> Result<()> {
//! let mut disk = DiskBuilder::new()
//!     .total_sectors(64)
//!     .sector_size(8)
//!     .none_label("Nenhum")
//!     .build()?;
//!
//! disk.allocate("notes.txt", "seven chars per sector", Some(10))?;
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::{
    allocator::{ChainPolicy, FirstFitPreferred},
    config::DiskConfig,
    disk::{Disk, DiskView},
    error::{AllocationError, DiskError, NotFoundError, Result},
    free_space::{format_ranges, DiskUsage, FreeRange},
    registry::{FileId, FileRecord, FileSummary},
    sector::{SectorPointer, SectorState, SectorView, TERMINAL_MARKER},
};

use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Normalize user-entered text before it reaches the disk
///
/// Windows line endings become `\n`, then every `\n` becomes a space, so
/// each stored character fits a single payload slot.
pub fn normalize_content(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\n', " ")
}

/// Thread-safe disk handle
///
/// Each call holds one exclusive lock for its whole body, so the free-list
/// snapshot an allocation plans against cannot change underneath it.
///
/// # Examples
///
/// ```rust
/// use sector_chain::{Disk, SharedDisk};
///
/// let disk = SharedDisk::new(Disk::default());
/// let handle = disk.clone();
/// std::thread::spawn(move || {
///     handle.allocate("bg.txt", "from a thread", None).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(disk.list_files().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedDisk {
    inner: Arc<Mutex<Disk>>,
}

impl SharedDisk {
    pub fn new(disk: Disk) -> Self {
        SharedDisk {
            inner: Arc::new(Mutex::new(disk)),
        }
    }

    pub fn init(&self, total_sectors: usize, sector_size: usize) -> Result<()> {
        self.inner.lock().init(total_sectors, sector_size)
    }

    pub fn allocate(
        &self,
        name: &str,
        content: &str,
        preferred_sector: Option<usize>,
    ) -> std::result::Result<FileSummary, AllocationError> {
        self.inner.lock().allocate(name, content, preferred_sector)
    }

    pub fn remove(&self, file_id: FileId) -> std::result::Result<FileSummary, NotFoundError> {
        self.inner.lock().remove(file_id)
    }

    pub fn list_files(&self) -> Vec<FileSummary> {
        self.inner.lock().list_files()
    }

    pub fn list_sectors(&self) -> Vec<SectorView> {
        self.inner.lock().list_sectors()
    }

    pub fn free_sector_ids(&self) -> Vec<usize> {
        self.inner.lock().free_sector_ids()
    }

    pub fn verify(&self) -> Result<()> {
        self.inner.lock().verify()
    }

    /// Run `f` against the disk under the lock
    pub fn with<R>(&self, f: impl FnOnce(&Disk) -> R) -> R {
        f(&self.inner.lock())
    }
}

/// Builder for Disk with custom configuration
///
/// # Examples
///
/// ```rust
/// use sector_chain::DiskBuilder;
///
/// let disk = DiskBuilder::new().total_sectors(16).build().unwrap();
/// assert_eq!(disk.usage().total_sectors, 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiskBuilder {
    config: DiskConfig,
}

impl DiskBuilder {
    /// Create a new DiskBuilder with the reference 28 x 4 geometry
    pub fn new() -> Self {
        DiskBuilder {
            config: DiskConfig::default(),
        }
    }

    /// Start from a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Loading disk config from {:?}", path.as_ref());
        Ok(DiskBuilder {
            config: DiskConfig::from_file(path)?,
        })
    }

    pub fn config(mut self, config: DiskConfig) -> Self {
        self.config = config;
        self
    }

    pub fn total_sectors(mut self, total_sectors: usize) -> Self {
        self.config.total_sectors = total_sectors;
        self
    }

    /// Bytes per sector including the pointer slot
    pub fn sector_size(mut self, sector_size: usize) -> Self {
        self.config.sector_size = sector_size;
        self
    }

    pub fn palette_size(mut self, palette_size: usize) -> Self {
        self.config.palette_size = palette_size;
        self
    }

    /// Label returned by range formatting when nothing is free
    pub fn none_label<S: Into<String>>(mut self, label: S) -> Self {
        self.config.none_label = label.into();
        self
    }

    /// Validate the configuration and build the disk
    pub fn build(self) -> Result<Disk> {
        Disk::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("a\r\nb\nc"), "a b c");
        assert_eq!(normalize_content("plain"), "plain");
        assert_eq!(normalize_content("\n"), " ");
    }

    #[test]
    fn test_builder_defaults() -> Result<()> {
        let disk = DiskBuilder::new().build()?;
        assert_eq!(disk.config(), &DiskConfig::default());
        Ok(())
    }

    #[test]
    fn test_builder_custom() -> Result<()> {
        let mut disk = DiskBuilder::new()
            .total_sectors(6)
            .sector_size(3)
            .palette_size(2)
            .none_label("-")
            .build()?;

        for name in ["a", "b", "c"] {
            disk.allocate(name, "xy", None)?;
        }
        let colors: Vec<_> = disk.list_files().iter().map(|f| f.color_index).collect();
        assert_eq!(colors, vec![0, 1, 0]);

        disk.allocate("d", "123456", None)?;
        assert_eq!(disk.free_ranges_label(), "-");
        Ok(())
    }

    #[test]
    fn test_builder_rejects_bad_geometry() {
        let result = DiskBuilder::new().sector_size(1).build();
        assert!(matches!(result, Err(DiskError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_from_file() -> Result<()> {
        let temp_dir = tempfile::TempDir::new()?;
        let path = temp_dir.path().join("disk.toml");
        std::fs::write(&path, "total_sectors = 12\nsector_size = 5\n")?;

        let disk = DiskBuilder::from_file(&path)?.build()?;
        assert_eq!(disk.usage().total_sectors, 12);
        assert_eq!(disk.usage().data_bytes_per_sector, 4);
        Ok(())
    }

    #[test]
    fn test_builder_missing_file() {
        let result = DiskBuilder::from_file("/nonexistent/disk.toml");
        assert!(matches!(result, Err(DiskError::Io(_))));
    }

    #[test]
    fn test_shared_disk_reinit() -> Result<()> {
        let disk = SharedDisk::default();
        disk.allocate("a", "abc", None)?;
        disk.init(5, 4)?;
        assert!(disk.list_files().is_empty());
        assert_eq!(disk.list_sectors().len(), 5);
        assert_eq!(disk.with(|d| d.usage().free_sectors), 5);
        Ok(())
    }
}
