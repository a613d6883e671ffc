//! File removal with residual-data semantics
//!
//! Removing a file only clears ownership. Payload bytes and pointers stay
//! on the freed sectors until a later allocation overwrites them.

use crate::core::error::NotFoundError;
use crate::core::registry::{FileId, FileRecord, FileRegistry};
use crate::core::sector::SectorStore;
use tracing::{debug, info};

/// Release a file's chain and drop it from the registry
///
/// Returns the removed record. An unknown id leaves everything untouched.
pub fn remove_file(
    store: &mut SectorStore,
    registry: &mut FileRegistry,
    file_id: FileId,
) -> Result<FileRecord, NotFoundError> {
    let Some(record) = registry.remove(file_id) else {
        debug!("Remove requested for unknown file {}", file_id);
        return Err(NotFoundError::FileNotFound(file_id));
    };

    for &sector_id in &record.sectors {
        if let Some(sector) = store.get_mut(sector_id) {
            sector.set_owner(None);
        }
    }

    info!(
        "Removed file {} '{}', freed sectors {:?}",
        record.id,
        record.name,
        record.sector_numbers()
    );

    Ok(record)
}
