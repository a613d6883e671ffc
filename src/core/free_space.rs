//! Free-space reporting
//!
//! Pure functions over the sector store. Ranges are reported with 1-based
//! sector numbers, matching what users see.

use crate::core::sector::{Sector, SectorStore};
use serde::Serialize;
use std::fmt;

/// A maximal run of consecutive free sector numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeRange {
    pub start: usize,
    pub end: usize,
}

impl FreeRange {
    /// Number of sectors in the run
    pub fn count(&self) -> usize {
        self.end - self.start + 1
    }
}

impl fmt::Display for FreeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Ascending 1-based numbers of unowned sectors
pub fn free_sector_ids(store: &SectorStore) -> Vec<usize> {
    store
        .iter()
        .filter(|sector| sector.is_free())
        .map(Sector::number)
        .collect()
}

/// Collapse integers into maximal consecutive runs
///
/// Input is sorted and de-duplicated first.
pub fn collapse_ranges(ids: &[usize]) -> Vec<FreeRange> {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<FreeRange> = Vec::new();
    for id in sorted {
        if let Some(range) = ranges.last_mut() {
            if range.end + 1 == id {
                range.end = id;
                continue;
            }
        }
        ranges.push(FreeRange { start: id, end: id });
    }
    ranges
}

/// Render ids as `"1-3, 5, 7-9"`, or `none` when there are no ids
pub fn format_ranges(ids: &[usize], none: &str) -> String {
    let ranges = collapse_ranges(ids);
    if ranges.is_empty() {
        return none.to_string();
    }

    ranges
        .iter()
        .map(FreeRange::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aggregate space accounting for a disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub total_sectors: usize,
    pub used_sectors: usize,
    pub free_sectors: usize,
    /// Characters stored across all live files
    pub data_bytes: usize,
    pub sector_size: usize,
    pub data_bytes_per_sector: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ranges() {
        assert_eq!(format_ranges(&[1, 2, 3, 5, 7, 8, 9], "none"), "1-3, 5, 7-9");
        assert_eq!(format_ranges(&[], "none"), "none");
        assert_eq!(format_ranges(&[4], "none"), "4");
    }

    #[test]
    fn test_format_ranges_custom_sentinel() {
        assert_eq!(format_ranges(&[], "Nenhum"), "Nenhum");
    }

    #[test]
    fn test_unsorted_input() {
        assert_eq!(format_ranges(&[9, 1, 8, 2, 2], "-"), "1-2, 8-9");
    }

    #[test]
    fn test_collapse_ranges() {
        let ranges = collapse_ranges(&[10, 11, 12, 20]);
        assert_eq!(
            ranges,
            vec![FreeRange { start: 10, end: 12 }, FreeRange { start: 20, end: 20 }]
        );
        assert_eq!(ranges[0].count(), 3);
    }

    #[test]
    fn test_free_sector_ids_are_one_based() {
        let store = SectorStore::new(3, 4);
        assert_eq!(free_sector_ids(&store), vec![1, 2, 3]);
    }
}
