#![allow(clippy::doc_markdown)] // Allow technical terms like MPI, SPMD in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Midpoint Pi
//!
//! Estimates π by integrating 4/(1+x²) over [0, 1] with the midpoint rule,
//! split across a fixed group of cooperating workers.
//!
//! ## Overview
//!
//! Every worker runs the same pipeline (SPMD):
//!
//! 1. learn its ordinal and the group size ([`group::GroupContext`])
//! 2. take its contiguous block of steps ([`partition::Partition`])
//! 3. wait at the start barrier and start its clock ([`reduce::synchronize`])
//! 4. sum the midpoint terms of its block ([`integrate::local_sum`])
//! 5. reduce all sums onto worker 0, which scales the total by the step
//!    width and stops its clock ([`reduce::reduce`])
//!
//! Any failure along the way aborts the whole run. A sum missing one worker's
//! contribution is never reported.
//!
//! ## Module Organization
//!
//! - [`group`] - Worker identity and the barrier/reduce collectives
//! - [`partition`] - Block decomposition of the step range
//! - [`integrate`] - Midpoint partial sums
//! - [`reduce`] - Start barrier, timing and sum reduction
//! - [`runner`] - The per-worker pipeline and its launchers
//! - [`state_machine`] - Worker lifecycle
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging
//! - [`report`] - Result rendering
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use midpoint_pi::runner::run_threaded;
//!
//! # fn example() -> midpoint_pi::Result<()> {
//! let result = run_threaded(1_000_000, 4)?;
//! println!("{}", midpoint_pi::report::render_text(&result));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod group;
pub mod integrate;
pub mod logging;
pub mod partition;
pub mod reduce;
pub mod report;
pub mod runner;
pub mod state_machine;

pub use config::{LogFormat, PiConfig};
pub use error::{PiError, Result};
pub use group::{GroupContext, ThreadGroup, WorkerGroup};
pub use integrate::{local_sum, sequential_estimate, step_width, PartialResult};
pub use partition::{partition_all, Partition};
pub use reduce::GlobalResult;
pub use runner::{run_threaded, run_worker, run_worker_with, WorkerOutcome};
