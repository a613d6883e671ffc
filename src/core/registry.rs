//! File registry
//!
//! Maps file ids to their records. Ids come from a monotonic counter and
//! are never reused, so id order is also insertion order.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// File identifier, assigned from 1 upwards
pub type FileId = u64;

/// A live file and the chain holding its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    /// Stored character count
    pub size: usize,
    /// 1-based number of the first chain sector
    pub start_sector: usize,
    /// 0-based sector ids in chain order
    pub sectors: Vec<usize>,
}

impl FileRecord {
    /// 1-based sector numbers in chain order
    pub fn sector_numbers(&self) -> Vec<usize> {
        self.sectors.iter().map(|id| id + 1).collect()
    }

    pub fn summary(&self, palette_size: usize) -> FileSummary {
        FileSummary {
            id: self.id,
            name: self.name.clone(),
            size: self.size,
            start_sector: self.start_sector,
            sectors: self.sectors.clone(),
            color_index: color_index(self.id, palette_size),
        }
    }
}

/// File record as exposed to callers, with a cosmetic color slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub id: FileId,
    pub name: String,
    pub size: usize,
    pub start_sector: usize,
    pub sectors: Vec<usize>,
    /// `(id - 1) mod palette_size`; carries no allocation meaning
    pub color_index: usize,
}

fn color_index(id: FileId, palette_size: usize) -> usize {
    if palette_size == 0 {
        return 0;
    }
    (id.saturating_sub(1) % palette_size as u64) as usize
}

/// In-memory file table with a case-normalized name index
#[derive(Debug, Clone)]
pub struct FileRegistry {
    files: BTreeMap<FileId, FileRecord>,
    names: HashMap<String, FileId, ahash::RandomState>,
    next_id: FileId,
}

impl FileRegistry {
    pub fn new() -> Self {
        FileRegistry {
            files: BTreeMap::new(),
            names: HashMap::default(),
            next_id: 1,
        }
    }

    /// Drop every file and restart the id counter (used by disk init only)
    pub(crate) fn clear(&mut self) {
        *self = FileRegistry::new();
    }

    /// Id the next registered file will receive
    pub fn next_id(&self) -> FileId {
        self.next_id
    }

    /// Hand out the next id; the counter never goes backwards
    pub(crate) fn take_id(&mut self) -> FileId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, record: FileRecord) {
        self.names.insert(normalize_name(&record.name), record.id);
        self.files.insert(record.id, record);
    }

    pub(crate) fn remove(&mut self, id: FileId) -> Option<FileRecord> {
        let record = self.files.remove(&id)?;
        self.names.remove(&normalize_name(&record.name));
        Some(record)
    }

    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.files.get(&id)
    }

    /// Case-insensitive lookup
    pub fn find_by_name(&self, name: &str) -> Option<&FileRecord> {
        self.names
            .get(&normalize_name(name))
            .and_then(|id| self.files.get(id))
    }

    /// Files in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}
