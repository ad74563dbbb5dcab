mod common;

use common::{assert_close, run_group_with};
use midpoint_pi::{
    local_sum, partition_all, run_threaded, sequential_estimate, step_width, PiError,
    WorkerOutcome,
};
use std::f64::consts::PI;

/// Sum of every worker's local sum, computed outside the group
fn expected_global_sum(num_steps: u64, workers: usize) -> f64 {
    let step = step_width(num_steps);
    partition_all(num_steps, workers)
        .iter()
        .map(|partition| local_sum(partition, step).local_sum)
        .sum()
}

#[test]
fn test_reduction_matches_sum_of_partials() {
    for workers in [1usize, 2, 7, 100] {
        let result = run_threaded(100_000, workers).expect("run succeeds");
        assert_eq!(result.workers, workers);
        assert_eq!(result.num_steps, 100_000);
        assert_close(
            result.global_sum,
            expected_global_sum(100_000, workers),
            1e-9,
        );
    }
}

#[test]
fn test_convergence() {
    let coarse = run_threaded(10_000, 4).unwrap();
    assert!((coarse.pi_estimate - PI).abs() < 1e-6);

    let fine = run_threaded(1_000_000, 4).unwrap();
    assert!((fine.pi_estimate - PI).abs() < 1e-10);
}

#[test]
fn test_single_worker_matches_sequential_integration() {
    for num_steps in [1u64, 17, 10_000, 250_000] {
        let result = run_threaded(num_steps as i64, 1).unwrap();
        assert_eq!(result.pi_estimate, sequential_estimate(num_steps));
    }
}

#[test]
fn test_more_workers_than_steps() {
    let result = run_threaded(5, 12).expect("idle workers still take part");
    assert_close(result.pi_estimate, sequential_estimate(5), 1e-12);
}

#[test]
fn test_only_result_owner_emits() {
    let outcomes = run_group_with(6, |_| 60_000);
    for (ordinal, outcome) in outcomes.into_iter().enumerate() {
        match outcome.expect("worker succeeds") {
            WorkerOutcome::Emitted(result) => {
                assert_eq!(ordinal, 0);
                assert!((result.pi_estimate - PI).abs() < 1e-8);
            }
            WorkerOutcome::Terminated => assert_ne!(ordinal, 0),
        }
    }
}

#[test]
fn test_elapsed_time_is_measured() {
    let result = run_threaded(200_000, 3).unwrap();
    assert!(result.elapsed_seconds > 0.0);
    assert!(result.elapsed_seconds < 60.0);
}

#[test]
fn test_non_positive_steps_abort_the_run() {
    for num_steps in [0i64, -5] {
        let err = run_threaded(num_steps, 4).unwrap_err();
        assert!(
            matches!(err, PiError::Configuration { ref field, .. } if field == "num_steps"),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn test_zero_workers_is_group_formation_error() {
    assert!(matches!(
        run_threaded(1_000, 0),
        Err(PiError::GroupFormation(_))
    ));
}
