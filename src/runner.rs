//! # SPMD Runner
//!
//! [`run_worker`] is the pipeline every worker executes identically:
//! validate, partition, start barrier, local integration, reduction. The
//! launchers put workers on a transport and turn the per-worker outcomes into
//! a single all-or-nothing result.

use crate::config::{validate_num_steps, PiConfig};
use crate::constants::operations;
use crate::error::{PiError, Result};
use crate::group::{FailureSlot, ThreadGroup, WorkerGroup};
use crate::integrate::{local_sum, step_width};
use crate::logging::log_error;
use crate::partition::Partition;
use crate::reduce::{reduce, synchronize, GlobalResult};
use crate::state_machine::{WorkerEvent, WorkerStateMachine};
use tracing::{debug, info, info_span};
use uuid::Uuid;

/// What a worker has to show once its pipeline ends
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    /// The result owner's estimate
    Emitted(GlobalResult),
    /// Every other worker finishes without output
    Terminated,
}

impl WorkerOutcome {
    pub fn into_result(self) -> Option<GlobalResult> {
        match self {
            Self::Emitted(result) => Some(result),
            Self::Terminated => None,
        }
    }
}

/// Run the full pipeline for the worker behind `group`
///
/// On failure the worker leaves the group through [`WorkerGroup::abort`], so
/// its peers fail too rather than waiting for it.
pub fn run_worker<G: WorkerGroup>(group: &mut G, num_steps: i64) -> Result<WorkerOutcome> {
    let mut machine = WorkerStateMachine::new(group.context());

    match execute_pipeline(group, &mut machine, num_steps) {
        Ok(outcome) => {
            group.finish();
            Ok(outcome)
        }
        Err(err) => {
            // Already-terminal machines keep their state
            let _ = machine.transition(WorkerEvent::abort_with(err.to_string()));
            group.abort(&err);
            Err(err)
        }
    }
}

/// Load this worker's configuration after it has joined `group`, then run it
///
/// A worker whose configuration cannot be loaded aborts the group instead of
/// exiting on its own, so peers never wait on a worker that is gone.
pub fn run_worker_with<G, F>(group: &mut G, load_config: F) -> Result<WorkerOutcome>
where
    G: WorkerGroup,
    F: FnOnce() -> Result<PiConfig>,
{
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            log_error("runner", "load_config", &err.to_string(), None);
            group.abort(&err);
            return Err(err);
        }
    };
    run_worker(group, config.num_steps)
}

fn execute_pipeline<G: WorkerGroup>(
    group: &mut G,
    machine: &mut WorkerStateMachine,
    num_steps: i64,
) -> Result<WorkerOutcome> {
    let context = group.context();
    let total_steps = validate_num_steps(num_steps)?;

    let partition = Partition::for_worker(total_steps, &context);
    machine.transition(WorkerEvent::Partition)?;
    debug!(
        ordinal = context.ordinal(),
        start = partition.start,
        count = partition.count,
        "Partition assigned"
    );

    machine.transition(WorkerEvent::EnterBarrier)?;
    let stopwatch = synchronize(group)?;

    let partial = local_sum(&partition, step_width(total_steps));
    machine.transition(WorkerEvent::ComputeLocalSum)?;

    let reduced = reduce(group, &partial, stopwatch, total_steps)?;
    machine.transition(WorkerEvent::Reduce)?;

    match reduced {
        Some(result) => {
            machine.transition(WorkerEvent::EmitResult)?;
            Ok(WorkerOutcome::Emitted(result))
        }
        None => {
            machine.transition(WorkerEvent::Terminate)?;
            Ok(WorkerOutcome::Terminated)
        }
    }
}

/// Run `workers` threads as one group and return the owner's result
pub fn run_threaded(num_steps: i64, workers: usize) -> Result<GlobalResult> {
    let run_id = Uuid::new_v4();
    let group = ThreadGroup::form(workers)?;
    let failure = group.failure_slot();
    let communicators = group.into_communicators();

    info!(
        run_id = %run_id,
        num_steps = num_steps,
        workers = workers,
        "Starting threaded run"
    );

    let outcomes: Vec<Result<WorkerOutcome>> = crossbeam::scope(|scope| {
        let handles: Vec<_> = communicators
            .into_iter()
            .map(|mut comm| {
                let ordinal = comm.context().ordinal();
                let handle = scope
                    .builder()
                    .name(format!("pi-worker-{ordinal}"))
                    .spawn(move |_| {
                        let span = info_span!("worker", run_id = %run_id, ordinal = ordinal);
                        let _entered = span.enter();
                        run_worker(&mut comm, num_steps)
                    });
                (ordinal, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(ordinal, handle)| match handle {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|_| Err(PiError::WorkerPanicked { ordinal })),
                Err(e) => Err(PiError::GroupFormation(format!(
                    "failed to start worker {ordinal}: {e}"
                ))),
            })
            .collect::<Vec<_>>()
    })
    .map_err(|_| PiError::GroupFormation("worker scope panicked".to_string()))?;

    let result = collect_outcomes(outcomes, &failure);
    match &result {
        Ok(global) => info!(
            run_id = %run_id,
            pi_estimate = global.pi_estimate,
            elapsed_seconds = global.elapsed_seconds,
            "Threaded run complete"
        ),
        Err(err) => log_error("runner", "run_threaded", &err.to_string(), None),
    }
    result
}

/// Reduce per-worker outcomes to the run's single result
///
/// Any failed worker fails the run. The reported error is the root cause:
/// the first failure recorded in the group, otherwise the first error that
/// is not a knock-on collective failure.
fn collect_outcomes(
    outcomes: Vec<Result<WorkerOutcome>>,
    failure: &FailureSlot,
) -> Result<GlobalResult> {
    let mut emitted = None;
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(WorkerOutcome::Emitted(result)) => emitted = Some(result),
            Ok(WorkerOutcome::Terminated) => {}
            Err(err) => errors.push(err),
        }
    }

    if !errors.is_empty() {
        let root_cause = failure
            .first()
            .map(|(_, err)| err)
            .or_else(|| errors.iter().find(|e| !e.is_collective()).cloned())
            .unwrap_or_else(|| errors.swap_remove(0));
        return Err(root_cause);
    }

    emitted.ok_or_else(|| {
        PiError::collective(operations::REDUCE_SUM, "no worker emitted a result")
    })
}

/// Join the MPI world, then load configuration and run this process's worker
///
/// Joining comes first so that a rank failing to load its configuration
/// takes the whole world down through `MPI_Abort`.
#[cfg(feature = "mpi")]
pub fn run_mpi<F>(load_config: F) -> Result<WorkerOutcome>
where
    F: FnOnce() -> Result<PiConfig>,
{
    let mut group = crate::group::MpiGroup::join()?;
    let span = info_span!("worker", ordinal = group.context().ordinal());
    let _entered = span.enter();
    run_worker_with(&mut group, load_config)
}
