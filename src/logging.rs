//! # Structured Logging Module
//!
//! Console logging through `tracing`. Output goes to stderr so the report on
//! stdout stays clean. The filter comes from `PI_LOG`, then `RUST_LOG`, then
//! the configured level.

use crate::config::LogFormat;
use crate::constants::env::{LOG_FILTER, RUST_LOG};
use crate::state_machine::WorkerState;
use chrono::Utc;
use std::io::IsTerminal;
use std::process;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(level: &str, format: LogFormat) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let directive = resolve_filter(level);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
        let ansi = std::io::stderr().is_terminal();

        let registry = tracing_subscriber::registry();
        let result = match format {
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_names(true)
                        .with_level(true)
                        .with_ansi(ansi)
                        .with_filter(filter),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_names(true)
                        .with_level(true)
                        .with_filter(filter),
                )
                .try_init(),
        };

        // Use try_init to avoid panic if global subscriber already set
        if result.is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::debug!(
            pid = process::id(),
            filter = %directive,
            format = format.as_str(),
            "Structured logging initialized"
        );
    });
}

/// Filter directive: `PI_LOG`, then `RUST_LOG`, then `level`
fn resolve_filter(level: &str) -> String {
    std::env::var(LOG_FILTER)
        .or_else(|_| std::env::var(RUST_LOG))
        .unwrap_or_else(|_| level.to_string())
}

/// Level after applying the CLI verbosity count on top of `base`
pub fn verbosity_level(base: &str, verbose: u8) -> String {
    match verbose {
        0 => base.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Log a worker lifecycle transition
pub fn log_worker_transition(
    ordinal: usize,
    from: WorkerState,
    to: WorkerState,
    event: &str,
    reason: Option<&str>,
) {
    if to == WorkerState::Aborted {
        tracing::warn!(
            ordinal = ordinal,
            from = %from,
            to = %to,
            event = %event,
            reason = reason,
            "WORKER_TRANSITION"
        );
    } else {
        tracing::debug!(
            ordinal = ordinal,
            from = %from,
            to = %to,
            event = %event,
            "WORKER_TRANSITION"
        );
    }
}

/// Log the completion of one collective call on one worker
pub fn log_collective_operation(
    operation: &str,
    ordinal: usize,
    sequence: u64,
    status: &str,
    duration: Duration,
) {
    tracing::debug!(
        operation = %operation,
        ordinal = ordinal,
        sequence = sequence,
        status = %status,
        duration_us = duration.as_micros() as u64,
        "COLLECTIVE_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_level() {
        assert_eq!(verbosity_level("info", 0), "info");
        assert_eq!(verbosity_level("warn", 1), "debug");
        assert_eq!(verbosity_level("info", 2), "trace");
        assert_eq!(verbosity_level("info", 7), "trace");
    }
}
