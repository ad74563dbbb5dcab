use serde::{Deserialize, Serialize};

/// Events that drive a worker through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WorkerEvent {
    /// Sub-range assigned by the partitioner
    Partition,
    /// Worker entered the start barrier
    EnterBarrier,
    /// Local sum finished after the barrier released. Integration runs
    /// after the barrier, so it falls inside the timed interval.
    ComputeLocalSum,
    /// Contribution handed to the reduction
    Reduce,
    /// Result owner computed the estimate
    EmitResult,
    /// Non-owner is done
    Terminate,
    /// Fatal failure with reason
    Abort(String),
}

impl WorkerEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Partition => "partition",
            Self::EnterBarrier => "enter_barrier",
            Self::ComputeLocalSum => "compute_local_sum",
            Self::Reduce => "reduce",
            Self::EmitResult => "emit_result",
            Self::Terminate => "terminate",
            Self::Abort(_) => "abort",
        }
    }

    /// Extract the reason if this is an abort event
    pub fn abort_reason(&self) -> Option<&str> {
        match self {
            Self::Abort(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn abort_with(reason: impl Into<String>) -> Self {
        Self::Abort(reason.into())
    }
}
