//! In-process worker group
//!
//! Each worker owns a [`ThreadCommunicator`] with a private inbox and a sender
//! to every peer's inbox. Collectives are message exchanges only; workers
//! share no numeric state.
//!
//! - barrier: every worker sends `Arrive` to the coordinator, which answers
//!   with `Release` once all have arrived.
//! - reduce: every worker sends its value to the root, which sums the
//!   contributions in ordinal order.
//!
//! A communicator dropped before [`WorkerGroup::finish`] (early error, panic)
//! tells every peer it left, so blocked peers fail instead of hanging.

use crate::constants::{operations, BARRIER_COORDINATOR_ORDINAL};
use crate::error::{PiError, Result};
use crate::group::{GroupContext, WorkerGroup};
use crate::logging::log_collective_operation;
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Messages exchanged by the collectives
#[derive(Debug, Clone, PartialEq)]
enum Envelope {
    Arrive { from: usize, sequence: u64 },
    Release { sequence: u64 },
    Contribution { from: usize, sequence: u64, value: f64 },
    Depart { from: usize },
}

impl Envelope {
    fn kind(&self) -> &'static str {
        match self {
            Self::Arrive { .. } => "arrive",
            Self::Release { .. } => "release",
            Self::Contribution { .. } => "contribution",
            Self::Depart { .. } => "depart",
        }
    }
}

/// First failure reported by any member of a group
///
/// Peers that fail because someone else left only see `PeerAborted`; the
/// slot keeps the original cause for the launcher.
#[derive(Debug, Clone, Default)]
pub struct FailureSlot {
    inner: Arc<Mutex<Option<(usize, PiError)>>>,
}

impl FailureSlot {
    /// Store the failure unless one is already recorded. Returns true if stored.
    pub fn record(&self, ordinal: usize, error: &PiError) -> bool {
        let mut slot = self.inner.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some((ordinal, error.clone()));
        true
    }

    pub fn first(&self) -> Option<(usize, PiError)> {
        self.inner.lock().clone()
    }
}

/// A freshly formed group, before its communicators are handed to workers
#[derive(Debug)]
pub struct ThreadGroup {
    communicators: Vec<ThreadCommunicator>,
    failure: FailureSlot,
}

impl ThreadGroup {
    /// Form a group of `size` workers with dense ordinals `0..size`
    pub fn form(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(PiError::GroupFormation(
                "cannot form a worker group with zero workers".to_string(),
            ));
        }

        let (senders, receivers): (Vec<Sender<Envelope>>, Vec<Receiver<Envelope>>) =
            (0..size).map(|_| channel::unbounded()).unzip();
        let failure = FailureSlot::default();

        let mut communicators = Vec::with_capacity(size);
        for (ordinal, inbox) in receivers.into_iter().enumerate() {
            let peers = senders
                .iter()
                .enumerate()
                .map(|(peer, sender)| (peer != ordinal).then(|| sender.clone()))
                .collect();
            communicators.push(ThreadCommunicator {
                context: GroupContext::new(ordinal, size)?,
                inbox,
                peers,
                sequence: 0,
                failure: failure.clone(),
                finished: false,
            });
        }

        debug!(
            operation = operations::GROUP_FORMATION,
            size = size,
            "Worker group formed"
        );
        Ok(Self {
            communicators,
            failure,
        })
    }

    pub fn size(&self) -> usize {
        self.communicators.len()
    }

    pub fn failure_slot(&self) -> FailureSlot {
        self.failure.clone()
    }

    /// Hand out the communicators, ordered by ordinal
    pub fn into_communicators(self) -> Vec<ThreadCommunicator> {
        self.communicators
    }
}

/// One worker's endpoint in a [`ThreadGroup`]
#[derive(Debug)]
pub struct ThreadCommunicator {
    context: GroupContext,
    inbox: Receiver<Envelope>,
    /// Indexed by ordinal; `None` at this worker's own position
    peers: Vec<Option<Sender<Envelope>>>,
    /// Number of collectives entered so far, identical across the group
    sequence: u64,
    failure: FailureSlot,
    finished: bool,
}

impl ThreadCommunicator {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn send_to(&self, ordinal: usize, envelope: Envelope, operation: &str) -> Result<()> {
        let sender = self
            .peers
            .get(ordinal)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                PiError::collective(operation, format!("no route to worker {ordinal}"))
            })?;
        sender.send(envelope).map_err(|_| PiError::PeerAborted {
            operation: operation.to_string(),
            ordinal,
        })
    }

    fn receive(&self, operation: &str) -> Result<Envelope> {
        match self.inbox.recv() {
            Ok(Envelope::Depart { from }) => Err(PiError::PeerAborted {
                operation: operation.to_string(),
                ordinal: from,
            }),
            Ok(envelope) => Ok(envelope),
            Err(_) => Err(PiError::collective(
                operation,
                "every peer disconnected from the group",
            )),
        }
    }

    fn check_sequence(expected: u64, received: u64) -> Result<()> {
        if expected == received {
            Ok(())
        } else {
            Err(PiError::ProtocolMismatch { expected, received })
        }
    }

    fn unexpected(operation: &str, envelope: &Envelope) -> PiError {
        PiError::collective(
            operation,
            format!("unexpected {} message", envelope.kind()),
        )
    }

    fn coordinate_barrier(&self, sequence: u64) -> Result<()> {
        let size = self.context.size();
        let mut arrived = vec![false; size];
        arrived[self.context.ordinal()] = true;

        for _ in 1..size {
            match self.receive(operations::BARRIER)? {
                Envelope::Arrive {
                    from,
                    sequence: received,
                } => {
                    Self::check_sequence(sequence, received)?;
                    if std::mem::replace(&mut arrived[from], true) {
                        return Err(PiError::collective(
                            operations::BARRIER,
                            format!("worker {from} arrived twice"),
                        ));
                    }
                }
                other => return Err(Self::unexpected(operations::BARRIER, &other)),
            }
        }

        for ordinal in (0..size).filter(|&o| o != self.context.ordinal()) {
            self.send_to(ordinal, Envelope::Release { sequence }, operations::BARRIER)?;
        }
        Ok(())
    }

    fn await_release(&self, sequence: u64) -> Result<()> {
        self.send_to(
            BARRIER_COORDINATOR_ORDINAL,
            Envelope::Arrive {
                from: self.context.ordinal(),
                sequence,
            },
            operations::BARRIER,
        )?;
        match self.receive(operations::BARRIER)? {
            Envelope::Release { sequence: received } => Self::check_sequence(sequence, received),
            other => Err(Self::unexpected(operations::BARRIER, &other)),
        }
    }

    fn collect_contributions(&self, sequence: u64, own: f64) -> Result<f64> {
        let size = self.context.size();
        let mut contributions: Vec<Option<f64>> = vec![None; size];
        contributions[self.context.ordinal()] = Some(own);

        for _ in 1..size {
            match self.receive(operations::REDUCE_SUM)? {
                Envelope::Contribution {
                    from,
                    sequence: received,
                    value,
                } => {
                    Self::check_sequence(sequence, received)?;
                    if contributions[from].replace(value).is_some() {
                        return Err(PiError::collective(
                            operations::REDUCE_SUM,
                            format!("worker {from} contributed twice"),
                        ));
                    }
                }
                other => return Err(Self::unexpected(operations::REDUCE_SUM, &other)),
            }
        }

        Ok(contributions.into_iter().flatten().sum())
    }

    fn announce_departure(&mut self) {
        let from = self.context.ordinal();
        for sender in self.peers.iter().flatten() {
            // Peers that already finished have dropped their inbox
            let _ = sender.send(Envelope::Depart { from });
        }
        self.finished = true;
    }
}

impl WorkerGroup for ThreadCommunicator {
    fn context(&self) -> GroupContext {
        self.context
    }

    fn barrier(&mut self) -> Result<()> {
        let sequence = self.next_sequence();
        let started = Instant::now();

        let result = if self.context.size() == 1 {
            Ok(())
        } else if self.context.ordinal() == BARRIER_COORDINATOR_ORDINAL {
            self.coordinate_barrier(sequence)
        } else {
            self.await_release(sequence)
        };

        log_collective_operation(
            operations::BARRIER,
            self.context.ordinal(),
            sequence,
            if result.is_ok() { "released" } else { "failed" },
            started.elapsed(),
        );
        result
    }

    fn reduce_sum(&mut self, value: f64, root: usize) -> Result<Option<f64>> {
        if root >= self.context.size() {
            return Err(PiError::collective(
                operations::REDUCE_SUM,
                format!(
                    "root {root} is outside a group of size {}",
                    self.context.size()
                ),
            ));
        }
        let sequence = self.next_sequence();
        let started = Instant::now();

        let result = if self.context.ordinal() == root {
            self.collect_contributions(sequence, value).map(Some)
        } else {
            self.send_to(
                root,
                Envelope::Contribution {
                    from: self.context.ordinal(),
                    sequence,
                    value,
                },
                operations::REDUCE_SUM,
            )
            .map(|()| None)
        };

        log_collective_operation(
            operations::REDUCE_SUM,
            self.context.ordinal(),
            sequence,
            match &result {
                Ok(Some(_)) => "reduced",
                Ok(None) => "contributed",
                Err(_) => "failed",
            },
            started.elapsed(),
        );
        result
    }

    fn finish(&mut self) {
        self.finished = true;
    }

    fn abort(&mut self, reason: &PiError) {
        if self.finished {
            return;
        }
        self.failure.record(self.context.ordinal(), reason);
        warn!(
            ordinal = self.context.ordinal(),
            reason = %reason,
            "Worker leaving group after failure"
        );
        self.announce_departure();
    }
}

impl Drop for ThreadCommunicator {
    fn drop(&mut self) {
        if !self.finished {
            self.announce_departure();
        }
    }
}
