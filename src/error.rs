//! # Error Types
//!
//! Structured errors for the whole pipeline. Every variant is fatal to the
//! run: there is no degraded mode, because a sum missing one worker's
//! contribution looks like a valid estimate.

use crate::state_machine::StateMachineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PiError {
    /// Invalid user or file configuration, detected before any collective runs
    #[error("Configuration error: {field}: {message}")]
    Configuration { field: String, message: String },

    /// Worker identity or group size could not be established
    #[error("Group formation error: {0}")]
    GroupFormation(String),

    /// A barrier or reduction could not complete
    #[error("Collective operation {operation} failed: {message}")]
    Collective { operation: String, message: String },

    /// A peer left the group before completing the collective protocol
    #[error("Collective operation {operation} aborted: worker {ordinal} left the group")]
    PeerAborted { operation: String, ordinal: usize },

    /// A message from a peer belongs to a different collective round
    #[error("Collective protocol mismatch: expected sequence {expected}, received {received}")]
    ProtocolMismatch { expected: u64, received: u64 },

    #[error("State transition error: {0}")]
    StateTransition(#[from] StateMachineError),

    /// A worker thread panicked before reporting an outcome
    #[error("Worker {ordinal} panicked")]
    WorkerPanicked { ordinal: usize },
}

impl PiError {
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn collective(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collective {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Configuration errors are raised before the group does any work.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Errors caused by the collective layer rather than by this worker.
    pub fn is_collective(&self) -> bool {
        matches!(
            self,
            Self::Collective { .. } | Self::PeerAborted { .. } | Self::ProtocolMismatch { .. }
        )
    }
}

impl From<::config::ConfigError> for PiError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::configuration("config", err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PiError>;
