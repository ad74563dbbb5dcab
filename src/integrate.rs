//! # Midpoint Integration
//!
//! Local partial sums of 4/(1+x²) at step midpoints. The step width is not
//! applied per term: the raw sum is scaled once, after the reduction.

use crate::constants::INTEGRAND_NUMERATOR;
use crate::partition::Partition;
use serde::Serialize;

/// Width of one integration step for `total_steps` steps over [0, 1]
pub fn step_width(total_steps: u64) -> f64 {
    1.0 / total_steps as f64
}

/// Unscaled sum produced by one worker
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartialResult {
    pub local_sum: f64,
    pub partition: Partition,
}

/// Sum of 4/(1+x²) at the midpoints of every step in `partition`
#[inline]
pub fn local_sum(partition: &Partition, step: f64) -> PartialResult {
    let mut sum = 0.0_f64;
    for i in partition.range() {
        let x = (i as f64 + 0.5) * step;
        sum += INTEGRAND_NUMERATOR / (1.0 + x * x);
    }
    PartialResult {
        local_sum: sum,
        partition: *partition,
    }
}

/// Single-threaded reference estimate over all `total_steps` steps
pub fn sequential_estimate(total_steps: u64) -> f64 {
    let whole = Partition {
        start: 0,
        count: total_steps,
    };
    let step = step_width(total_steps);
    local_sum(&whole, step).local_sum * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_empty_partition_sums_to_zero() {
        let empty = Partition {
            start: 7,
            count: 0,
        };
        assert_eq!(local_sum(&empty, 0.1).local_sum, 0.0);
    }

    #[test]
    fn test_single_step_midpoint() {
        // One step over [0,1]: midpoint 0.5, 4 / 1.25 = 3.2
        let part = Partition { start: 0, count: 1 };
        let result = local_sum(&part, step_width(1));
        assert!((result.local_sum - 3.2).abs() < 1e-15);
        assert_eq!(result.partition, part);
    }

    #[test]
    fn test_blocks_add_up_to_whole() {
        let step = step_width(1_000);
        let left = local_sum(&Partition { start: 0, count: 400 }, step).local_sum;
        let right = local_sum(&Partition { start: 400, count: 600 }, step).local_sum;
        let whole = local_sum(&Partition { start: 0, count: 1_000 }, step).local_sum;
        assert!(((left + right) - whole).abs() / whole < 1e-12);
    }

    #[test]
    fn test_sequential_estimate_converges() {
        assert!((sequential_estimate(10_000) - PI).abs() < 1e-6);
        assert!((sequential_estimate(1_000_000) - PI).abs() < 1e-10);
    }
}
