#![allow(dead_code)]

pub mod strategies;

use midpoint_pi::{run_worker, PiError, ThreadGroup, WorkerGroup, WorkerOutcome};
use std::thread;

/// Relative comparison for reduced floating-point sums
pub fn assert_close(actual: f64, expected: f64, rel_tol: f64) {
    let scale = expected.abs().max(f64::MIN_POSITIVE);
    let rel = (actual - expected).abs() / scale;
    assert!(
        rel < rel_tol,
        "expected {expected}, got {actual} (relative error {rel:e} >= {rel_tol:e})"
    );
}

/// Run one thread group where each worker may be handed its own step count
///
/// Returns the outcome of every worker in ordinal order.
pub fn run_group_with(
    workers: usize,
    steps_for: impl Fn(usize) -> i64,
) -> Vec<Result<WorkerOutcome, PiError>> {
    let communicators = ThreadGroup::form(workers)
        .expect("group formation")
        .into_communicators();
    let handles: Vec<_> = communicators
        .into_iter()
        .map(|mut comm| {
            let steps = steps_for(comm.context().ordinal());
            thread::spawn(move || run_worker(&mut comm, steps))
        })
        .collect();
    handles
        .into_iter()
        .map(|handle| handle.join().expect("worker thread panicked"))
        .collect()
}
