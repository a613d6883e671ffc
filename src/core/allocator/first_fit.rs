//! First-fit ascending chain policy with preferred-sector override
//!
//! The preferred sector, when requested, always heads the chain. The rest
//! of the chain is filled with the lowest free ids in ascending order.
//! No attempt is made to keep chains contiguous or to reduce
//! fragmentation: the resulting layout is observable behavior.

use crate::core::allocator::ChainPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstFitPreferred;

impl ChainPolicy for FirstFitPreferred {
    fn build_chain(&self, free_ids: &[usize], needed: usize, preferred: Option<usize>) -> Vec<usize> {
        let mut chain = Vec::with_capacity(needed);
        chain.extend(preferred);

        for &sector_id in free_ids {
            if chain.len() >= needed {
                break;
            }
            if Some(sector_id) != preferred {
                chain.push(sector_id);
            }
        }

        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_ids_first() {
        let chain = FirstFitPreferred.build_chain(&[2, 3, 7, 9], 3, None);
        assert_eq!(chain, vec![2, 3, 7]);
    }

    #[test]
    fn test_preferred_skipped_in_scan() {
        let chain = FirstFitPreferred.build_chain(&[0, 1, 2, 3], 3, Some(1));
        assert_eq!(chain, vec![1, 0, 2]);
    }

    #[test]
    fn test_preferred_above_all_others() {
        let chain = FirstFitPreferred.build_chain(&[0, 5, 27], 2, Some(27));
        assert_eq!(chain, vec![27, 0]);
    }

    #[test]
    fn test_single_sector_with_preferred() {
        let chain = FirstFitPreferred.build_chain(&[0, 1, 4], 1, Some(4));
        assert_eq!(chain, vec![4]);
    }
}
