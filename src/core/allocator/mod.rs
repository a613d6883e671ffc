//! Sector chain allocation
//!
//! Allocation runs in two phases:
//! - **Plan**: validate the request, snapshot the free ids, let a
//!   [`ChainPolicy`] pick the chain and check it against the snapshot.
//! - **Write**: fill each chain sector's payload, link its pointer and
//!   claim ownership, then register the file.
//!
//! Nothing is written until planning has fully succeeded.

pub mod first_fit;

pub use first_fit::FirstFitPreferred;

use crate::core::error::AllocationError;
use crate::core::registry::{FileRecord, FileRegistry};
use crate::core::sector::{SectorPointer, SectorStore};
use tracing::{debug, info};

/// Chooses which free sectors form a new file's chain
pub trait ChainPolicy {
    /// Build a chain of `needed` sector ids
    ///
    /// `free_ids` are ascending 0-based ids of unowned sectors and
    /// `preferred`, when given, is a 0-based id already known to be free.
    /// The returned chain must hold `needed` distinct ids from `free_ids`
    /// and start with `preferred` when one was requested.
    fn build_chain(&self, free_ids: &[usize], needed: usize, preferred: Option<usize>) -> Vec<usize>;
}

/// Number of sectors needed to hold `len` characters
pub fn sectors_needed(len: usize, data_bytes_per_sector: usize) -> usize {
    if data_bytes_per_sector == 0 {
        return 0;
    }
    (len + data_bytes_per_sector - 1) / data_bytes_per_sector
}

/// Allocate a chain for `content` and register it as a new file
///
/// `preferred_sector` is 1-based. On error the store and registry are
/// left untouched.
pub fn allocate_file<P: ChainPolicy + ?Sized>(
    store: &mut SectorStore,
    registry: &mut FileRegistry,
    policy: &P,
    name: &str,
    content: &str,
    preferred_sector: Option<usize>,
) -> Result<FileRecord, AllocationError> {
    let name = name.trim();
    if name.is_empty() {
        debug!("Rejecting allocation: empty name");
        return Err(AllocationError::EmptyName);
    }

    if registry.find_by_name(name).is_some() {
        debug!("Rejecting allocation: '{}' already exists", name);
        return Err(AllocationError::DuplicateName(name.to_string()));
    }

    let chars: Vec<char> = content.chars().collect();
    if chars.is_empty() {
        debug!("Rejecting allocation of '{}': empty content", name);
        return Err(AllocationError::EmptyContent);
    }

    let total = store.total_sectors();
    let preferred = match preferred_sector {
        Some(requested) if requested < 1 || requested > total => {
            debug!("Rejecting allocation of '{}': sector {} out of range", name, requested);
            return Err(AllocationError::PreferredSectorOutOfRange { requested, total });
        }
        Some(requested) => Some(requested - 1),
        None => None,
    };

    let data_bytes = store.data_bytes_per_sector();
    let needed = sectors_needed(chars.len(), data_bytes);
    let free_ids = store.free_ids();

    if let Some(preferred_id) = preferred {
        if !store.get(preferred_id).map_or(false, |sector| sector.is_free()) {
            debug!("Rejecting allocation of '{}': sector {} occupied", name, preferred_id + 1);
            return Err(AllocationError::PreferredSectorOccupied(preferred_id + 1));
        }
    }

    if free_ids.len() < needed {
        debug!(
            "Rejecting allocation of '{}': need {} sectors, {} free",
            name,
            needed,
            free_ids.len()
        );
        return Err(AllocationError::InsufficientSpace {
            needed,
            free: free_ids.len(),
        });
    }

    let chain = policy.build_chain(&free_ids, needed, preferred);
    check_chain(store, &chain, needed, preferred)?;
    debug!("Planned chain {:?} for '{}'", chain, name);

    // Planning succeeded; from here on nothing can fail
    let file_id = registry.take_id();
    for (position, (&sector_id, chunk)) in chain.iter().zip(chars.chunks(data_bytes)).enumerate() {
        let pointer = chain
            .get(position + 1)
            .map_or(SectorPointer::Terminal, |&next| SectorPointer::to_sector(next));

        if let Some(sector) = store.get_mut(sector_id) {
            sector.write_payload(chunk);
            sector.set_pointer(pointer);
            sector.set_owner(Some(file_id));
        }
    }

    let record = FileRecord {
        id: file_id,
        name: name.to_string(),
        size: chars.len(),
        start_sector: chain[0] + 1,
        sectors: chain,
    };
    registry.insert(record.clone());

    info!(
        "Allocated file {} '{}' ({} chars) in sectors {:?}",
        record.id,
        record.name,
        record.size,
        record.sector_numbers()
    );

    Ok(record)
}

/// Reject chains that would break the disk invariants
fn check_chain(
    store: &SectorStore,
    chain: &[usize],
    needed: usize,
    preferred: Option<usize>,
) -> Result<(), AllocationError> {
    if chain.len() != needed || chain.is_empty() {
        return Err(AllocationError::PolicyViolation(format!(
            "expected {} sectors, got {}",
            needed,
            chain.len()
        )));
    }

    if let Some(preferred_id) = preferred {
        if chain[0] != preferred_id {
            return Err(AllocationError::PolicyViolation(format!(
                "chain must start at preferred sector {}",
                preferred_id + 1
            )));
        }
    }

    let mut seen = vec![false; store.total_sectors()];
    for &sector_id in chain {
        match store.get(sector_id) {
            Some(sector) if sector.is_free() && !seen[sector_id] => seen[sector_id] = true,
            Some(sector) if !sector.is_free() => {
                return Err(AllocationError::PolicyViolation(format!(
                    "sector {} is not free",
                    sector_id + 1
                )))
            }
            Some(_) => {
                return Err(AllocationError::PolicyViolation(format!(
                    "sector {} appears twice",
                    sector_id + 1
                )))
            }
            None => {
                return Err(AllocationError::PolicyViolation(format!(
                    "sector id {} does not exist",
                    sector_id
                )))
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sector::SectorState;

    fn setup() -> (SectorStore, FileRegistry) {
        (SectorStore::new(28, 4), FileRegistry::new())
    }

    #[test]
    fn test_sectors_needed() {
        assert_eq!(sectors_needed(5, 3), 2);
        assert_eq!(sectors_needed(6, 3), 2);
        assert_eq!(sectors_needed(1, 3), 1);
        assert_eq!(sectors_needed(0, 3), 0);
    }

    #[test]
    fn test_allocate_hello() {
        let (mut store, mut registry) = setup();
        let record =
            allocate_file(&mut store, &mut registry, &FirstFitPreferred, "a.txt", "hello", None)
                .unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.sectors, vec![0, 1]);
        assert_eq!(record.start_sector, 1);
        assert_eq!(record.size, 5);

        let first = store.get(0).unwrap();
        assert_eq!(first.payload(), &[Some('h'), Some('e'), Some('l')]);
        assert_eq!(first.pointer().to_string(), "2");

        let second = store.get(1).unwrap();
        assert_eq!(second.payload(), &[Some('l'), Some('o'), None]);
        assert_eq!(second.pointer().to_string(), "&");
        assert_eq!(second.owner(), Some(1));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_sector() {
        let (mut store, mut registry) = setup();
        let record =
            allocate_file(&mut store, &mut registry, &FirstFitPreferred, "six", "abcdef", None)
                .unwrap();
        assert_eq!(record.sectors.len(), 2);
        assert_eq!(store.get(2).unwrap().state(), SectorState::FreeClean);
    }

    #[test]
    fn test_preferred_sector_leads_chain() {
        let (mut store, mut registry) = setup();
        let record = allocate_file(
            &mut store,
            &mut registry,
            &FirstFitPreferred,
            "b.txt",
            "abcdefg",
            Some(5),
        )
        .unwrap();

        // Preferred first, then lowest free ids
        assert_eq!(record.sectors, vec![4, 0, 1]);
        assert_eq!(record.start_sector, 5);
        assert_eq!(store.get(4).unwrap().pointer(), SectorPointer::Next(1));
        assert_eq!(store.get(0).unwrap().pointer(), SectorPointer::Next(2));
        assert_eq!(store.get(1).unwrap().pointer(), SectorPointer::Terminal);
    }

    #[test]
    fn test_validation_order() {
        let (mut store, mut registry) = setup();
        allocate_file(&mut store, &mut registry, &FirstFitPreferred, "a", "x", None).unwrap();

        // Empty name wins over every other problem
        let err = allocate_file(&mut store, &mut registry, &FirstFitPreferred, "  ", "", Some(99));
        assert_eq!(err.unwrap_err(), AllocationError::EmptyName);

        let err = allocate_file(&mut store, &mut registry, &FirstFitPreferred, "A", "", Some(99));
        assert_eq!(err.unwrap_err(), AllocationError::DuplicateName("A".to_string()));

        let err = allocate_file(&mut store, &mut registry, &FirstFitPreferred, "b", "", Some(99));
        assert_eq!(err.unwrap_err(), AllocationError::EmptyContent);

        let err = allocate_file(&mut store, &mut registry, &FirstFitPreferred, "b", "x", Some(0));
        assert_eq!(
            err.unwrap_err(),
            AllocationError::PreferredSectorOutOfRange { requested: 0, total: 28 }
        );

        let err = allocate_file(&mut store, &mut registry, &FirstFitPreferred, "b", "x", Some(1));
        assert_eq!(err.unwrap_err(), AllocationError::PreferredSectorOccupied(1));
    }

    #[test]
    fn test_preferred_sector_bounds() {
        let (mut store, mut registry) = setup();
        let before = store.clone();

        let err = allocate_file(&mut store, &mut registry, &FirstFitPreferred, "x", "abc", Some(29));
        assert_eq!(
            err.unwrap_err(),
            AllocationError::PreferredSectorOutOfRange { requested: 29, total: 28 }
        );
        assert_eq!(store, before);
        assert!(registry.is_empty());

        // The last sector is a valid start and still heads the chain
        let record =
            allocate_file(&mut store, &mut registry, &FirstFitPreferred, "x", "abcd", Some(28))
                .unwrap();
        assert_eq!(record.sectors, vec![27, 0]);
        assert_eq!(record.start_sector, 28);
        assert_eq!(store.get(27).unwrap().pointer(), SectorPointer::Next(1));
    }

    #[test]
    fn test_occupied_reported_before_insufficient_space() {
        let mut store = SectorStore::new(2, 4);
        let mut registry = FileRegistry::new();
        allocate_file(&mut store, &mut registry, &FirstFitPreferred, "a", "x", None).unwrap();

        let err = allocate_file(
            &mut store,
            &mut registry,
            &FirstFitPreferred,
            "b",
            "a very long text",
            Some(1),
        );
        assert_eq!(err.unwrap_err(), AllocationError::PreferredSectorOccupied(1));

        let err = allocate_file(
            &mut store,
            &mut registry,
            &FirstFitPreferred,
            "b",
            "a very long text",
            None,
        );
        assert_eq!(
            err.unwrap_err(),
            AllocationError::InsufficientSpace { needed: 6, free: 1 }
        );
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let (mut store, mut registry) = setup();
        let record =
            allocate_file(&mut store, &mut registry, &FirstFitPreferred, "u", "ção", None).unwrap();
        assert_eq!(record.size, 3);
        assert_eq!(record.sectors.len(), 1);
        assert_eq!(store.get(0).unwrap().payload(), &[Some('ç'), Some('ã'), Some('o')]);
    }

    struct DuplicatingPolicy;

    impl ChainPolicy for DuplicatingPolicy {
        fn build_chain(&self, free_ids: &[usize], needed: usize, _: Option<usize>) -> Vec<usize> {
            vec![free_ids[0]; needed]
        }
    }

    #[test]
    fn test_misbehaving_policy_is_rejected_without_writes() {
        let (mut store, mut registry) = setup();
        let before = store.clone();

        let err = allocate_file(&mut store, &mut registry, &DuplicatingPolicy, "d", "abcdef", None);
        assert!(matches!(err, Err(AllocationError::PolicyViolation(_))));
        assert_eq!(store, before);
        assert!(registry.is_empty());
        assert_eq!(registry.next_id(), 1);
    }
}
