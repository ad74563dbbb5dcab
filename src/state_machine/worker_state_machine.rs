use super::{
    errors::{StateMachineError, StateMachineResult},
    events::WorkerEvent,
    states::WorkerState,
};
use crate::group::GroupContext;
use crate::logging::log_worker_transition;

/// Per-worker lifecycle tracking
///
/// Every worker owns exactly one machine. Transitions are validated against
/// the pipeline order, and the terminal state is guarded by the worker's role:
/// only the result owner may emit, every other worker terminates silently.
#[derive(Debug, Clone)]
pub struct WorkerStateMachine {
    context: GroupContext,
    state: WorkerState,
}

impl WorkerStateMachine {
    pub fn new(context: GroupContext) -> Self {
        Self {
            context,
            state: WorkerState::default(),
        }
    }

    pub fn current_state(&self) -> WorkerState {
        self.state
    }

    /// Attempt to transition the worker state
    pub fn transition(&mut self, event: WorkerEvent) -> StateMachineResult<WorkerState> {
        let current_state = self.state;
        let target_state = self.determine_target_state(current_state, &event)?;

        self.check_guards(target_state)?;

        self.state = target_state;
        log_worker_transition(
            self.context.ordinal(),
            current_state,
            target_state,
            event.event_type(),
            event.abort_reason(),
        );

        Ok(target_state)
    }

    /// Determine the target state based on current state and event
    fn determine_target_state(
        &self,
        current_state: WorkerState,
        event: &WorkerEvent,
    ) -> StateMachineResult<WorkerState> {
        let target = match (current_state, event) {
            (WorkerState::Init, WorkerEvent::Partition) => WorkerState::Partitioned,
            (WorkerState::Partitioned, WorkerEvent::EnterBarrier) => WorkerState::BarrierWait,
            (WorkerState::BarrierWait, WorkerEvent::ComputeLocalSum) => {
                WorkerState::LocalSumComputed
            }
            (WorkerState::LocalSumComputed, WorkerEvent::Reduce) => WorkerState::Reduced,
            (WorkerState::Reduced, WorkerEvent::EmitResult) => WorkerState::ResultEmitted,
            (WorkerState::Reduced, WorkerEvent::Terminate) => WorkerState::Terminated,

            // Any live worker may fail; finished workers stay finished
            (from_state, WorkerEvent::Abort(_)) if !from_state.is_terminal() => {
                WorkerState::Aborted
            }

            (from_state, _) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from_state.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }

    fn check_guards(&self, target_state: WorkerState) -> StateMachineResult<()> {
        match target_state {
            WorkerState::ResultEmitted if !self.context.is_result_owner() => {
                Err(StateMachineError::GuardFailed {
                    reason: format!(
                        "worker {} is not the result owner and cannot emit a result",
                        self.context.ordinal()
                    ),
                })
            }
            WorkerState::Terminated if self.context.is_result_owner() => {
                Err(StateMachineError::GuardFailed {
                    reason: "the result owner must emit a result before finishing".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(ordinal: usize, size: usize) -> WorkerStateMachine {
        WorkerStateMachine::new(GroupContext::new(ordinal, size).unwrap())
    }

    fn advance_to_reduced(sm: &mut WorkerStateMachine) {
        sm.transition(WorkerEvent::Partition).unwrap();
        sm.transition(WorkerEvent::EnterBarrier).unwrap();
        sm.transition(WorkerEvent::ComputeLocalSum).unwrap();
        sm.transition(WorkerEvent::Reduce).unwrap();
    }

    #[test]
    fn test_result_owner_happy_path() {
        let mut sm = machine(0, 4);
        assert_eq!(sm.current_state(), WorkerState::Init);
        advance_to_reduced(&mut sm);
        assert_eq!(
            sm.transition(WorkerEvent::EmitResult),
            Ok(WorkerState::ResultEmitted)
        );
        assert!(sm.current_state().is_terminal());
    }

    #[test]
    fn test_non_owner_terminates() {
        let mut sm = machine(2, 4);
        advance_to_reduced(&mut sm);
        assert_eq!(
            sm.transition(WorkerEvent::Terminate),
            Ok(WorkerState::Terminated)
        );
    }

    #[test]
    fn test_role_guards() {
        let mut owner = machine(0, 2);
        advance_to_reduced(&mut owner);
        assert!(matches!(
            owner.transition(WorkerEvent::Terminate),
            Err(StateMachineError::GuardFailed { .. })
        ));

        let mut peer = machine(1, 2);
        advance_to_reduced(&mut peer);
        assert!(matches!(
            peer.transition(WorkerEvent::EmitResult),
            Err(StateMachineError::GuardFailed { .. })
        ));
        // A rejected transition leaves the state untouched
        assert_eq!(peer.current_state(), WorkerState::Reduced);
    }

    #[test]
    fn test_out_of_order_event_rejected() {
        let mut sm = machine(0, 1);
        let err = sm.transition(WorkerEvent::Reduce).unwrap_err();
        assert_eq!(
            err,
            StateMachineError::InvalidTransition {
                from: "init".to_string(),
                event: "reduce".to_string(),
            }
        );
    }

    #[test]
    fn test_abort_from_live_state_only() {
        let mut sm = machine(1, 3);
        sm.transition(WorkerEvent::Partition).unwrap();
        sm.transition(WorkerEvent::EnterBarrier).unwrap();
        assert_eq!(
            sm.transition(WorkerEvent::abort_with("peer left")),
            Ok(WorkerState::Aborted)
        );
        assert!(sm.transition(WorkerEvent::abort_with("again")).is_err());
    }
}
