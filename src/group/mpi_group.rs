//! Multi-process worker group on `MPI_COMM_WORLD`
//!
//! Launch with `mpirun -n <workers> midpoint-pi --transport mpi`. Ordinal and
//! size come from the MPI runtime; the collectives map directly onto
//! `MPI_Barrier` and `MPI_Reduce` with `MPI_SUM`.

use crate::constants::operations;
use crate::error::{PiError, Result};
use crate::group::{GroupContext, WorkerGroup};
use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;
use tracing::{debug, error};

pub struct MpiGroup {
    world: SimpleCommunicator,
    context: GroupContext,
    // Dropped last: finalizes the MPI environment
    _universe: Universe,
}

impl MpiGroup {
    /// Join the MPI world. Fails if the MPI runtime cannot be initialized.
    pub fn join() -> Result<Self> {
        let universe = mpi::initialize().ok_or_else(|| {
            PiError::GroupFormation("MPI environment could not be initialized".to_string())
        })?;
        let world = universe.world();

        let ordinal = usize::try_from(world.rank())
            .map_err(|e| PiError::GroupFormation(format!("invalid MPI rank: {e}")))?;
        let size = usize::try_from(world.size())
            .map_err(|e| PiError::GroupFormation(format!("invalid MPI world size: {e}")))?;
        let context = GroupContext::new(ordinal, size)?;

        debug!(
            operation = operations::GROUP_FORMATION,
            ordinal = ordinal,
            size = size,
            "Joined MPI world"
        );
        Ok(Self {
            world,
            context,
            _universe: universe,
        })
    }

    fn rank_of(ordinal: usize) -> Result<mpi::Rank> {
        mpi::Rank::try_from(ordinal).map_err(|e| {
            PiError::collective(operations::REDUCE_SUM, format!("invalid root: {e}"))
        })
    }
}

impl WorkerGroup for MpiGroup {
    fn context(&self) -> GroupContext {
        self.context
    }

    fn barrier(&mut self) -> Result<()> {
        self.world.barrier();
        Ok(())
    }

    fn reduce_sum(&mut self, value: f64, root: usize) -> Result<Option<f64>> {
        let root_process = self.world.process_at_rank(Self::rank_of(root)?);
        if self.context.ordinal() == root {
            let mut sum = 0.0_f64;
            root_process.reduce_into_root(&value, &mut sum, SystemOperation::sum());
            Ok(Some(sum))
        } else {
            root_process.reduce_into(&value, SystemOperation::sum());
            Ok(None)
        }
    }

    fn abort(&mut self, reason: &PiError) {
        error!(
            ordinal = self.context.ordinal(),
            reason = %reason,
            "Aborting every rank of the MPI world"
        );
        self.world.abort(1)
    }
}
