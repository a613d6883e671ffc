//! Sector records and the fixed-length sector store
//!
//! A sector holds `sector_size - 1` payload slots plus one pointer slot.
//! The store owns every sector but applies no allocation policy; the
//! allocator and deallocator write into records by id.

use crate::core::registry::FileId;
use serde::{Serialize, Serializer};
use std::fmt;

/// Rendered value of the terminal pointer
pub const TERMINAL_MARKER: &str = "&";

/// Forward link stored in a sector's pointer slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectorPointer {
    /// Never written
    #[default]
    Empty,
    /// Last sector of a chain
    Terminal,
    /// 1-based number of the next sector in the chain
    Next(usize),
}

impl SectorPointer {
    /// Pointer to the sector with 0-based id `sector_id`
    pub fn to_sector(sector_id: usize) -> Self {
        SectorPointer::Next(sector_id + 1)
    }

    /// 0-based id of the next sector, if this pointer links anywhere
    pub fn next_sector(&self) -> Option<usize> {
        match self {
            SectorPointer::Next(number) => number.checked_sub(1),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SectorPointer::Empty)
    }
}

impl fmt::Display for SectorPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectorPointer::Empty => Ok(()),
            SectorPointer::Terminal => f.write_str(TERMINAL_MARKER),
            SectorPointer::Next(number) => write!(f, "{}", number),
        }
    }
}

impl Serialize for SectorPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single sector record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sector {
    id: usize,
    payload: Vec<Option<char>>,
    pointer: SectorPointer,
    owner: Option<FileId>,
}

impl Sector {
    /// Fresh sector: empty payload, empty pointer, no owner
    pub fn new(id: usize, data_bytes: usize) -> Self {
        Sector {
            id,
            payload: vec![None; data_bytes],
            pointer: SectorPointer::Empty,
            owner: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// 1-based sector number as shown to users
    pub fn number(&self) -> usize {
        self.id + 1
    }

    pub fn payload(&self) -> &[Option<char>] {
        &self.payload
    }

    pub fn pointer(&self) -> SectorPointer {
        self.pointer
    }

    pub fn owner(&self) -> Option<FileId> {
        self.owner
    }

    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// Free, but still carrying bytes or a link from a removed file
    pub fn is_residual(&self) -> bool {
        self.is_free() && (self.payload.iter().any(Option::is_some) || !self.pointer.is_empty())
    }

    pub fn state(&self) -> SectorState {
        if !self.is_free() {
            SectorState::Used
        } else if self.is_residual() {
            SectorState::FreeResidual
        } else {
            SectorState::FreeClean
        }
    }

    /// Overwrite every payload slot with `chunk`, padding the tail with empty slots
    pub(crate) fn write_payload(&mut self, chunk: &[char]) {
        for (index, slot) in self.payload.iter_mut().enumerate() {
            *slot = chunk.get(index).copied();
        }
    }

    pub(crate) fn set_pointer(&mut self, pointer: SectorPointer) {
        self.pointer = pointer;
    }

    pub(crate) fn set_owner(&mut self, owner: Option<FileId>) {
        self.owner = owner;
    }
}

/// Derived classification of a sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorState {
    /// Part of a live file's chain
    Used,
    /// Free and never written (or fully cleared by `init`)
    FreeClean,
    /// Free, retaining payload or pointer from a removed file
    FreeResidual,
}

/// Read-only sector snapshot for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorView {
    /// 0-based id
    pub id: usize,
    /// 1-based number
    pub number: usize,
    pub payload: Vec<Option<char>>,
    pub pointer: SectorPointer,
    pub owner: Option<FileId>,
    pub owner_name: Option<String>,
    pub state: SectorState,
}

/// Fixed-length array of sectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorStore {
    sectors: Vec<Sector>,
    sector_size: usize,
}

impl SectorStore {
    /// Create `total_sectors` fresh sectors of `sector_size` bytes each
    pub fn new(total_sectors: usize, sector_size: usize) -> Self {
        let data_bytes = sector_size.saturating_sub(1);
        SectorStore {
            sectors: (0..total_sectors).map(|id| Sector::new(id, data_bytes)).collect(),
            sector_size,
        }
    }

    /// Replace all sectors with fresh records
    pub fn init(&mut self, total_sectors: usize, sector_size: usize) {
        *self = SectorStore::new(total_sectors, sector_size);
    }

    pub fn total_sectors(&self) -> usize {
        self.sectors.len()
    }

    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    pub fn data_bytes_per_sector(&self) -> usize {
        self.sector_size.saturating_sub(1)
    }

    pub fn get(&self, id: usize) -> Option<&Sector> {
        self.sectors.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Sector> {
        self.sectors.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter()
    }

    /// Ascending 0-based ids of unowned sectors
    pub fn free_ids(&self) -> Vec<usize> {
        self.sectors
            .iter()
            .filter(|sector| sector.is_free())
            .map(Sector::id)
            .collect()
    }

    pub fn used_count(&self) -> usize {
        self.sectors.iter().filter(|sector| !sector.is_free()).count()
    }
}
