// Worker lifecycle state machine
//
// Tracks each worker through partitioning, the start barrier, local
// integration and the reduction, ending in exactly one terminal state.

pub mod errors;
pub mod events;
pub mod states;
pub mod worker_state_machine;

// Re-export main types for convenient access
pub use errors::{StateMachineError, StateMachineResult};
pub use events::WorkerEvent;
pub use states::WorkerState;
pub use worker_state_machine::WorkerStateMachine;
