//! Chain integrity checks and read-back
//!
//! Verification covers ownership, disjointness, coverage and pointer
//! linkage. Reading walks the on-disk pointers instead of trusting the
//! registry's chain list.

use crate::core::allocator::sectors_needed;
use crate::core::error::{DiskError, Result};
use crate::core::registry::{FileId, FileRecord, FileRegistry};
use crate::core::sector::{SectorPointer, SectorStore};
use tracing::warn;

fn corrupted(message: String) -> DiskError {
    warn!("Integrity violation: {}", message);
    DiskError::Corrupted(message)
}

/// Check every sector/chain invariant of the disk
pub fn verify(store: &SectorStore, registry: &FileRegistry) -> Result<()> {
    let mut claimed: Vec<Option<FileId>> = vec![None; store.total_sectors()];
    let data_bytes = store.data_bytes_per_sector();

    for file in registry.iter() {
        let expected = sectors_needed(file.size, data_bytes);
        if file.sectors.len() != expected {
            return Err(corrupted(format!(
                "file {} holds {} sectors, {} expected for {} chars",
                file.id,
                file.sectors.len(),
                expected,
                file.size
            )));
        }

        if file.sectors.first().map(|id| id + 1) != Some(file.start_sector) {
            return Err(corrupted(format!(
                "file {} start sector {} does not head its chain",
                file.id, file.start_sector
            )));
        }

        for (position, &sector_id) in file.sectors.iter().enumerate() {
            let Some(slot) = claimed.get_mut(sector_id) else {
                return Err(corrupted(format!(
                    "file {} references missing sector id {}",
                    file.id, sector_id
                )));
            };
            if let Some(other) = *slot {
                return Err(corrupted(format!(
                    "sector {} claimed by files {} and {}",
                    sector_id + 1,
                    other,
                    file.id
                )));
            }
            *slot = Some(file.id);

            let Some(sector) = store.get(sector_id) else {
                return Err(corrupted(format!("sector id {} missing", sector_id)));
            };
            if sector.owner() != Some(file.id) {
                return Err(corrupted(format!(
                    "sector {} owner {:?} but in chain of file {}",
                    sector_id + 1,
                    sector.owner(),
                    file.id
                )));
            }

            let expected_pointer = file
                .sectors
                .get(position + 1)
                .map_or(SectorPointer::Terminal, |&next| SectorPointer::to_sector(next));
            if sector.pointer() != expected_pointer {
                return Err(corrupted(format!(
                    "sector {} points to '{}', expected '{}'",
                    sector_id + 1,
                    sector.pointer(),
                    expected_pointer
                )));
            }
        }
    }

    for sector in store.iter() {
        if sector.owner() != claimed[sector.id()] {
            return Err(corrupted(format!(
                "sector {} owned by {:?} outside any recorded chain",
                sector.number(),
                sector.owner()
            )));
        }
    }

    Ok(())
}

/// Reassemble a file's content by following its pointer chain
pub fn read_chain(store: &SectorStore, file: &FileRecord) -> Result<String> {
    let mut content = String::with_capacity(file.size);
    let mut remaining = file.size;
    let mut current = file.start_sector.checked_sub(1);
    let mut visited = 0usize;

    while let Some(sector_id) = current {
        visited += 1;
        if visited > store.total_sectors() {
            return Err(corrupted(format!("file {} chain loops", file.id)));
        }

        let Some(sector) = store.get(sector_id) else {
            return Err(corrupted(format!(
                "file {} chain leaves the disk at id {}",
                file.id, sector_id
            )));
        };
        if sector.owner() != Some(file.id) {
            return Err(corrupted(format!(
                "file {} chain enters sector {} owned by {:?}",
                file.id,
                sector.number(),
                sector.owner()
            )));
        }

        for ch in sector.payload().iter().flatten().take(remaining) {
            content.push(*ch);
            remaining -= 1;
        }

        current = match sector.pointer() {
            SectorPointer::Terminal => None,
            SectorPointer::Next(_) => sector.pointer().next_sector(),
            SectorPointer::Empty => {
                return Err(corrupted(format!(
                    "file {} chain breaks at sector {}",
                    file.id,
                    sector.number()
                )))
            }
        };
    }

    if remaining != 0 {
        return Err(corrupted(format!(
            "file {} chain ended {} chars short",
            file.id, remaining
        )));
    }

    Ok(content)
}
