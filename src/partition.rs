//! # Block Partitioning
//!
//! Splits the step range `[0, N)` into one contiguous block per worker. Blocks
//! differ in size by at most one step; the remainder goes to the lowest
//! ordinals. Pure and deterministic: the same `(N, context)` always yields
//! the same block.

use crate::group::GroupContext;
use serde::Serialize;
use std::ops::Range;

/// Contiguous block of step indices owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Partition {
    pub start: u64,
    pub count: u64,
}

impl Partition {
    /// Block assigned to the worker described by `context`
    pub fn for_worker(total_steps: u64, context: &GroupContext) -> Self {
        Self::block(total_steps, context.ordinal() as u64, context.size() as u64)
    }

    fn block(total_steps: u64, ordinal: u64, size: u64) -> Self {
        let base = total_steps / size;
        let remainder = total_steps % size;
        let start = ordinal * base + ordinal.min(remainder);
        let count = base + u64::from(ordinal < remainder);
        Self { start, count }
    }

    /// One past the last step of this block
    pub fn end(&self) -> u64 {
        self.start + self.count
    }

    pub fn range(&self) -> Range<u64> {
        self.start..self.end()
    }

    /// Workers beyond the step count get an empty block but still take part
    /// in every collective.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Every worker's block in ordinal order
pub fn partition_all(total_steps: u64, workers: usize) -> Vec<Partition> {
    let size = workers as u64;
    (0..size)
        .map(|ordinal| Partition::block(total_steps, ordinal, size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let parts = partition_all(12, 4);
        assert_eq!(
            parts,
            vec![
                Partition { start: 0, count: 3 },
                Partition { start: 3, count: 3 },
                Partition { start: 6, count: 3 },
                Partition { start: 9, count: 3 },
            ]
        );
    }

    #[test]
    fn test_remainder_goes_to_lowest_ordinals() {
        let parts = partition_all(10, 4);
        let counts: Vec<u64> = parts.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![3, 3, 2, 2]);
        assert_eq!(parts[2].range(), 6..8);
        assert_eq!(parts[3].end(), 10);
    }

    #[test]
    fn test_more_workers_than_steps() {
        let parts = partition_all(3, 5);
        let counts: Vec<u64> = parts.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 0, 0]);
        assert!(parts[3].is_empty());
        assert!(parts[4].is_empty());
        // Empty blocks sit at the end of the domain and cover nothing
        assert_eq!(parts[4].range(), 3..3);
    }

    #[test]
    fn test_for_worker_matches_partition_all() {
        let all = partition_all(1_000_003, 7);
        for (ordinal, expected) in all.iter().enumerate() {
            let ctx = GroupContext::new(ordinal, 7).unwrap();
            assert_eq!(&Partition::for_worker(1_000_003, &ctx), expected);
        }
    }

    #[test]
    fn test_single_worker_owns_everything() {
        let part = Partition::for_worker(42, &GroupContext::solo());
        assert_eq!(part, Partition { start: 0, count: 42 });
    }
}
