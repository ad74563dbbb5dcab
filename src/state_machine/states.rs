use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single worker in the SPMD pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Group membership established, nothing computed yet
    Init,
    /// Sub-range of the integration domain assigned
    Partitioned,
    /// Blocked in, or released from, the start barrier
    BarrierWait,
    /// Local midpoint sum available
    LocalSumComputed,
    /// Contribution delivered to the reduction
    Reduced,
    /// Result owner produced the global result
    ResultEmitted,
    /// Non-owner finished without output
    Terminated,
    /// Run failed; no result is produced by anyone
    Aborted,
}

impl WorkerState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResultEmitted | Self::Terminated | Self::Aborted)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Partitioned => write!(f, "partitioned"),
            Self::BarrierWait => write!(f, "barrier_wait"),
            Self::LocalSumComputed => write!(f, "local_sum_computed"),
            Self::Reduced => write!(f, "reduced"),
            Self::ResultEmitted => write!(f, "result_emitted"),
            Self::Terminated => write!(f, "terminated"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

impl std::str::FromStr for WorkerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(Self::Init),
            "partitioned" => Ok(Self::Partitioned),
            "barrier_wait" => Ok(Self::BarrierWait),
            "local_sum_computed" => Ok(Self::LocalSumComputed),
            "reduced" => Ok(Self::Reduced),
            "result_emitted" => Ok(Self::ResultEmitted),
            "terminated" => Ok(Self::Terminated),
            "aborted" => Ok(Self::Aborted),
            _ => Err(format!("Invalid worker state: {s}")),
        }
    }
}

impl Default for WorkerState {
    fn default() -> Self {
        Self::Init
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(WorkerState::ResultEmitted.is_terminal());
        assert!(WorkerState::Terminated.is_terminal());
        assert!(WorkerState::Aborted.is_terminal());
        assert!(!WorkerState::Reduced.is_terminal());
        assert!(!WorkerState::Init.is_terminal());
    }

    #[test]
    fn test_string_round_trip() {
        for state in [
            WorkerState::Init,
            WorkerState::Partitioned,
            WorkerState::BarrierWait,
            WorkerState::LocalSumComputed,
            WorkerState::Reduced,
            WorkerState::ResultEmitted,
            WorkerState::Terminated,
            WorkerState::Aborted,
        ] {
            assert_eq!(state.to_string().parse::<WorkerState>(), Ok(state));
        }
        assert!("running".parse::<WorkerState>().is_err());
    }
}
