//! # Worker Groups
//!
//! Identity of a worker inside the group and the two collective operations
//! the pipeline needs from whatever transport connects the workers.
//!
//! ## Transports
//!
//! - [`ThreadGroup`] - one OS thread per worker, collectives over `crossbeam`
//!   channels. Always available.
//! - `MpiGroup` - one process per worker on `MPI_COMM_WORLD`. Behind the
//!   `mpi` feature.

pub mod thread_group;

#[cfg(feature = "mpi")]
pub mod mpi_group;

pub use thread_group::{FailureSlot, ThreadCommunicator, ThreadGroup};

#[cfg(feature = "mpi")]
pub use mpi_group::MpiGroup;

use crate::constants::RESULT_OWNER_ORDINAL;
use crate::error::{PiError, Result};
use serde::Serialize;

/// Ordinal identity of one worker and the size of its group
///
/// Created once when the worker joins its group and never changed.
/// Invariant: `ordinal < size` and `size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GroupContext {
    ordinal: usize,
    size: usize,
}

impl GroupContext {
    pub fn new(ordinal: usize, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(PiError::GroupFormation(
                "a worker group needs at least one member".to_string(),
            ));
        }
        if ordinal >= size {
            return Err(PiError::GroupFormation(format!(
                "ordinal {ordinal} is outside a group of size {size}"
            )));
        }
        Ok(Self { ordinal, size })
    }

    /// Context of a worker that runs alone
    pub fn solo() -> Self {
        Self {
            ordinal: 0,
            size: 1,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_result_owner(&self) -> bool {
        self.ordinal == RESULT_OWNER_ORDINAL
    }
}

/// Collective capability shared by every worker of a group
///
/// Every member must call the collectives in the same order. A failure in any
/// collective is fatal to the whole run.
pub trait WorkerGroup {
    /// Identity of the calling worker
    fn context(&self) -> GroupContext;

    /// Block until every member of the group has called `barrier`
    fn barrier(&mut self) -> Result<()>;

    /// Sum `value` across the group, delivered only to `root`
    ///
    /// Returns `Some(sum)` on the root and `None` everywhere else. Summation
    /// order depends on the transport; callers compare results with a
    /// tolerance.
    fn reduce_sum(&mut self, value: f64, root: usize) -> Result<Option<f64>>;

    /// Mark the protocol as completed by this worker
    fn finish(&mut self) {}

    /// Abandon the run and make every peer fail instead of waiting
    fn abort(&mut self, reason: &PiError);
}
