//! Messages exchanged between the dispatcher, its handles and the workers.
//!
//! Nothing here is shared: every message is moved into a channel, and a
//! connection's stream travels inside its [`Assignment`].

use std::fmt;

use tokio::sync::oneshot;

use crate::connection::BoxIo;

/// A connection handed to a worker: the owned stream and the peer address.
pub struct Assignment {
    pub(crate) io: BoxIo,
    pub(crate) addr: String,
}

impl Assignment {
    pub(crate) fn new(io: BoxIo, addr: String) -> Self {
        Self { io, addr }
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assignment").field("addr", &self.addr).finish_non_exhaustive()
    }
}

/// What a worker reports back to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    /// The assignment is finished, whatever its outcome. Sent exactly once per
    /// assignment.
    Done,
    /// The request asked for a pool-wide reload. Always sent before the
    /// matching `Done`.
    Reload,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerEvent {
    pub(crate) slot: usize,
    pub(crate) generation: u64,
    pub(crate) message: WorkerMessage,
}

pub(crate) enum Command {
    Accept(Assignment),
    Reload,
    Status(oneshot::Sender<PoolStatus>),
}

/// A point-in-time view of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatus {
    /// Bumped by every reload, starting at 0.
    pub generation: u64,
    pub slots: Vec<SlotStatus>,
    /// Connections waiting for a free slot.
    pub pending: usize,
}

impl PoolStatus {
    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.free).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    pub id: usize,
    pub free: bool,
}
