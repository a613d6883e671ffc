//! Disk: sector store, file registry and configuration in one object
//!
//! Every operation runs to completion before returning. Hosts that share
//! a disk between threads should go through [`SharedDisk`](crate::SharedDisk),
//! which serializes whole operations behind one lock.

use crate::core::allocator::{self, FirstFitPreferred};
use crate::core::config::DiskConfig;
use crate::core::deallocator;
use crate::core::error::{AllocationError, DiskError, NotFoundError, Result};
use crate::core::free_space::{self, DiskUsage, FreeRange};
use crate::core::integrity;
use crate::core::registry::{FileId, FileRegistry, FileSummary};
use crate::core::sector::{SectorStore, SectorView};
use serde::Serialize;
use tracing::info;

/// Simulated block device
#[derive(Debug, Clone)]
pub struct Disk {
    config: DiskConfig,
    store: SectorStore,
    registry: FileRegistry,
}

impl Disk {
    /// Create a disk from a validated configuration
    pub fn new(config: DiskConfig) -> Result<Self> {
        config.validate_geometry()?;
        Ok(Self::with_config(config))
    }

    /// Construct from a configuration already known to be valid
    fn with_config(config: DiskConfig) -> Self {
        info!(
            "Initializing disk: {} sectors of {} bytes",
            config.total_sectors, config.sector_size
        );
        Disk {
            store: SectorStore::new(config.total_sectors, config.sector_size),
            registry: FileRegistry::new(),
            config,
        }
    }

    /// Reset to `total_sectors` fresh sectors of `sector_size` bytes
    ///
    /// All files are dropped and the id counter restarts at 1. Invalid
    /// geometry is rejected and the disk is left as it was.
    pub fn init(&mut self, total_sectors: usize, sector_size: usize) -> Result<()> {
        let config = DiskConfig {
            total_sectors,
            sector_size,
            ..self.config.clone()
        };
        config.validate_geometry()?;

        info!("Resetting disk: {} sectors of {} bytes", total_sectors, sector_size);
        self.store.init(total_sectors, sector_size);
        self.registry.clear();
        self.config = config;
        Ok(())
    }

    /// Store `content` as a new file named `name`
    ///
    /// `preferred_sector` is 1-based; when given it heads the chain.
    pub fn allocate(
        &mut self,
        name: &str,
        content: &str,
        preferred_sector: Option<usize>,
    ) -> std::result::Result<FileSummary, AllocationError> {
        let record = allocator::allocate_file(
            &mut self.store,
            &mut self.registry,
            &FirstFitPreferred,
            name,
            content,
            preferred_sector,
        )?;
        Ok(record.summary(self.config.palette_size))
    }

    /// Remove a file, leaving its bytes behind as residual data
    pub fn remove(&mut self, file_id: FileId) -> std::result::Result<FileSummary, NotFoundError> {
        let record = deallocator::remove_file(&mut self.store, &mut self.registry, file_id)?;
        Ok(record.summary(self.config.palette_size))
    }

    /// Live files in creation order
    pub fn list_files(&self) -> Vec<FileSummary> {
        self.registry
            .iter()
            .map(|record| record.summary(self.config.palette_size))
            .collect()
    }

    /// Every sector in ascending id order
    pub fn list_sectors(&self) -> Vec<SectorView> {
        self.store
            .iter()
            .map(|sector| SectorView {
                id: sector.id(),
                number: sector.number(),
                payload: sector.payload().to_vec(),
                pointer: sector.pointer(),
                owner: sector.owner(),
                owner_name: sector
                    .owner()
                    .and_then(|id| self.registry.get(id))
                    .map(|file| file.name.clone()),
                state: sector.state(),
            })
            .collect()
    }

    pub fn file(&self, file_id: FileId) -> Option<FileSummary> {
        self.registry
            .get(file_id)
            .map(|record| record.summary(self.config.palette_size))
    }

    pub fn find_by_name(&self, name: &str) -> Option<FileSummary> {
        self.registry
            .find_by_name(name)
            .map(|record| record.summary(self.config.palette_size))
    }

    /// Ascending 1-based numbers of free sectors
    pub fn free_sector_ids(&self) -> Vec<usize> {
        free_space::free_sector_ids(&self.store)
    }

    pub fn free_ranges(&self) -> Vec<FreeRange> {
        free_space::collapse_ranges(&self.free_sector_ids())
    }

    /// Format `ids` with this disk's "none" label
    pub fn format_ranges(&self, ids: &[usize]) -> String {
        free_space::format_ranges(ids, &self.config.none_label)
    }

    /// Free sectors rendered as ranges, e.g. `"3-9, 12"`
    pub fn free_ranges_label(&self) -> String {
        self.format_ranges(&self.free_sector_ids())
    }

    pub fn usage(&self) -> DiskUsage {
        let used_sectors = self.store.used_count();
        DiskUsage {
            total_sectors: self.store.total_sectors(),
            used_sectors,
            free_sectors: self.store.total_sectors() - used_sectors,
            data_bytes: self.registry.iter().map(|file| file.size).sum(),
            sector_size: self.store.sector_size(),
            data_bytes_per_sector: self.store.data_bytes_per_sector(),
        }
    }

    /// Content of a file, read back through its pointer chain
    pub fn read_file(&self, file_id: FileId) -> Result<String> {
        let record = self
            .registry
            .get(file_id)
            .ok_or(NotFoundError::FileNotFound(file_id))?;
        integrity::read_chain(&self.store, record)
    }

    /// Check all sector and chain invariants
    pub fn verify(&self) -> Result<()> {
        integrity::verify(&self.store, &self.registry)
    }

    pub fn config(&self) -> &DiskConfig {
        &self.config
    }

    pub fn store(&self) -> &SectorStore {
        &self.store
    }

    /// Snapshot of everything a renderer needs
    pub fn view(&self) -> DiskView {
        DiskView {
            files: self.list_files(),
            sectors: self.list_sectors(),
            usage: self.usage(),
            free_ranges: self.free_ranges_label(),
        }
    }

    pub fn view_json(&self) -> Result<String> {
        serde_json::to_string(&self.view()).map_err(DiskError::from)
    }
}

impl Default for Disk {
    fn default() -> Self {
        Self::with_config(DiskConfig::default())
    }
}

/// Serializable disk snapshot for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskView {
    pub files: Vec<FileSummary>,
    pub sectors: Vec<SectorView>,
    pub usage: DiskUsage,
    pub free_ranges: String,
}
