//! # Synchronization and Reduction
//!
//! The two collective phases of a run. [`synchronize`] holds every worker at
//! the start barrier and starts its clock once released; [`reduce`] sums all
//! partial results on the result owner, stops its clock and scales the sum
//! into the estimate.

use crate::constants::RESULT_OWNER_ORDINAL;
use crate::error::Result;
use crate::group::WorkerGroup;
use crate::integrate::{step_width, PartialResult};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Wall-clock started after the start barrier released this worker
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Final estimate, only ever produced on the result owner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalResult {
    pub global_sum: f64,
    pub pi_estimate: f64,
    pub elapsed_seconds: f64,
    pub num_steps: u64,
    pub workers: usize,
}

impl GlobalResult {
    /// Scale a reduced sum of `total_steps` midpoint terms into an estimate
    pub fn from_sum(global_sum: f64, total_steps: u64, workers: usize, elapsed: Duration) -> Self {
        Self {
            global_sum,
            pi_estimate: global_sum * step_width(total_steps),
            elapsed_seconds: elapsed.as_secs_f64(),
            num_steps: total_steps,
            workers,
        }
    }
}

/// Wait at the start barrier, then start this worker's clock
pub fn synchronize<G: WorkerGroup>(group: &mut G) -> Result<Stopwatch> {
    group.barrier()?;
    Ok(Stopwatch::start())
}

/// Sum every worker's partial result onto the result owner
///
/// Returns the global result on the owner and `None` on every other worker.
pub fn reduce<G: WorkerGroup>(
    group: &mut G,
    partial: &PartialResult,
    stopwatch: Stopwatch,
    total_steps: u64,
) -> Result<Option<GlobalResult>> {
    let context = group.context();
    let reduced = group.reduce_sum(partial.local_sum, RESULT_OWNER_ORDINAL)?;

    Ok(reduced.map(|global_sum| {
        let elapsed = stopwatch.elapsed();
        debug!(
            ordinal = context.ordinal(),
            global_sum = global_sum,
            elapsed_ns = elapsed.as_nanos() as u64,
            "Reduction complete"
        );
        GlobalResult::from_sum(global_sum, total_steps, context.size(), elapsed)
    }))
}
