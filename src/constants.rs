//! # System Constants
//!
//! Operational defaults and identifiers shared by the partitioning,
//! integration and reduction stages.

/// Step count used when the caller does not supply one.
pub const DEFAULT_NUM_STEPS: i64 = 1_000_000;

/// Ordinal of the worker that receives the reduced sum and emits the result.
pub const RESULT_OWNER_ORDINAL: usize = 0;

/// Ordinal that coordinates barrier arrivals in the thread transport.
pub const BARRIER_COORDINATOR_ORDINAL: usize = 0;

/// Numerator of the integrand 4/(1+x²).
pub const INTEGRAND_NUMERATOR: f64 = 4.0;

/// Nanoseconds per second, used when rendering elapsed time.
pub const NANOS_PER_SECOND: f64 = 1e9;

/// Names of the collective operations, as they appear in logs and errors.
pub mod operations {
    pub const GROUP_FORMATION: &str = "group_formation";
    pub const BARRIER: &str = "barrier";
    pub const REDUCE_SUM: &str = "reduce_sum";
}

/// Environment variables read by the configuration and logging layers.
pub mod env {
    /// Prefix for layered configuration overrides (`PI_NUM_STEPS`, `PI_WORKERS`, ...).
    pub const CONFIG_PREFIX: &str = "PI";
    /// Log filter directive, takes precedence over `RUST_LOG`.
    pub const LOG_FILTER: &str = "PI_LOG";
    pub const RUST_LOG: &str = "RUST_LOG";
}
