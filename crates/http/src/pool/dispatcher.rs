//! The dispatcher owns the slot table and the pending queue.
//!
//! It runs as a single task and handles one event at a time: accepted
//! connections and control commands arrive through [`DispatcherHandle`],
//! completion and reload requests arrive from the workers. The slot table is
//! only ever mutated inside [`Dispatcher::run`].

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::config::PoolConfig;
use super::message::{Assignment, Command, PoolStatus, SlotStatus, WorkerEvent, WorkerMessage};
use super::pending::PendingQueue;
use super::worker::WorkerRuntime;
use crate::connection::{AsyncIo, BoxIo, respond_and_close};
use crate::handler::Handler;
use crate::protocol::DispatchError;

const TOO_MANY_REQUESTS: &str = "Too Many Requests";

#[derive(Debug)]
struct WorkerSlot {
    id: usize,
    worker: WorkerRuntime,
    free: bool,
}

pub struct Dispatcher {
    config: PoolConfig,
    handler: Arc<dyn Handler>,
    slots: Vec<WorkerSlot>,
    pending: PendingQueue,
    generation: u64,
    events_tx: mpsc::UnboundedSender<WorkerEvent>,
    events_rx: mpsc::UnboundedReceiver<WorkerEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Dispatcher {
    /// Spawns the worker pool and returns the dispatcher together with the
    /// first handle to it. Nothing is dispatched until [`Dispatcher::run`] is
    /// polled.
    ///
    /// Must be called within a tokio runtime.
    pub fn new<H: Handler>(config: PoolConfig, handler: H) -> (Self, DispatcherHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands) = mpsc::unbounded_channel();

        let mut dispatcher = Self {
            pending: PendingQueue::new(config.pending_limit()),
            config,
            handler: Arc::new(handler),
            slots: Vec::new(),
            generation: 0,
            events_tx,
            events_rx,
            commands,
        };
        dispatcher.slots = (0..dispatcher.config.worker_count())
            .map(|id| WorkerSlot { id, worker: dispatcher.spawn_worker(id), free: true })
            .collect();

        (dispatcher, DispatcherHandle { commands: commands_tx })
    }

    /// Spawns the dispatcher onto the current runtime.
    pub fn start<H: Handler>(config: PoolConfig, handler: H) -> (DispatcherHandle, JoinHandle<()>) {
        let (dispatcher, handle) = Self::new(config, handler);
        (handle, tokio::spawn(dispatcher.run()))
    }

    /// Processes events until every [`DispatcherHandle`] is dropped, then
    /// terminates the workers.
    pub async fn run(mut self) {
        info!(workers = self.slots.len(), max_pending = ?self.config.pending_limit(), "dispatcher started");

        loop {
            tokio::select! {
                biased;

                Some(event) = self.events_rx.recv() => self.on_event(event),

                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
            }
        }

        info!(pending = self.pending.len(), "all handles dropped, dispatcher stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Accept(assignment) => self.on_accept(assignment),
            Command::Reload => {
                info!("pool reload signalled");
                self.reload();
            }
            Command::Status(reply) => {
                // the requester may have given up waiting
                let _ = reply.send(self.status());
            }
        }
    }

    fn on_accept(&mut self, assignment: Assignment) {
        if let Some(index) = self.slots.iter().position(|slot| slot.free) {
            self.dispatch(index, assignment);
            return;
        }

        match self.pending.push(assignment) {
            Ok(()) => debug!(pending = self.pending.len(), "no free worker, connection queued"),
            Err(rejected) => {
                warn!(addr = %rejected.addr, pending = self.pending.len(), "pending queue is full, reject connection");
                tokio::spawn(async move {
                    if let Err(e) = respond_and_close(rejected.io, StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS).await {
                        debug!(addr = %rejected.addr, cause = %e, "failed to reject connection");
                    }
                });
            }
        }
    }

    fn on_event(&mut self, event: WorkerEvent) {
        if event.generation != self.generation {
            trace!(slot = event.slot, generation = event.generation, "discard message from replaced worker");
            return;
        }

        match event.message {
            WorkerMessage::Done => self.on_done(event.slot),
            WorkerMessage::Reload => {
                info!(slot = event.slot, "pool reload requested by worker");
                self.reload();
            }
        }
    }

    fn on_done(&mut self, index: usize) {
        if index >= self.slots.len() {
            error!(slot = index, "completion from unknown slot");
            return;
        }

        match self.pending.pop() {
            Some(assignment) => self.dispatch(index, assignment),
            None => self.slots[index].free = true,
        }
    }

    /// Hands `assignment` to the worker of slot `index` and marks the slot busy.
    fn dispatch(&mut self, index: usize, assignment: Assignment) {
        trace!(slot = index, addr = %assignment.addr, "dispatch connection");
        self.slots[index].free = false;

        let Err(assignment) = self.slots[index].worker.assign(assignment) else {
            return;
        };

        warn!(slot = index, "worker is gone, respawn it");
        self.slots[index].worker = self.spawn_worker(index);
        if let Err(assignment) = self.slots[index].worker.assign(assignment) {
            error!(slot = index, addr = %assignment.addr, "respawned worker refused connection, drop it");
            self.slots[index].free = true;
        }
    }

    /// Replaces every worker, abandoning whatever they were serving, then
    /// hands queued connections to the fresh slots.
    fn reload(&mut self) {
        self.generation += 1;
        info!(generation = self.generation, workers = self.slots.len(), "reload worker pool");

        for index in 0..self.slots.len() {
            let worker = self.spawn_worker(index);
            let slot = &mut self.slots[index];
            // the replaced runtime aborts its task on drop
            slot.worker = worker;
            slot.free = true;
        }

        while !self.pending.is_empty() {
            let Some(index) = self.slots.iter().position(|slot| slot.free) else {
                break;
            };
            if let Some(assignment) = self.pending.pop() {
                self.dispatch(index, assignment);
            }
        }
    }

    fn spawn_worker(&self, slot: usize) -> WorkerRuntime {
        WorkerRuntime::spawn(
            slot,
            self.generation,
            Arc::clone(&self.handler),
            self.events_tx.clone(),
            self.config.head_limit(),
        )
    }

    fn status(&self) -> PoolStatus {
        PoolStatus {
            generation: self.generation,
            slots: self.slots.iter().map(|slot| SlotStatus { id: slot.id, free: slot.free }).collect(),
            pending: self.pending.len(),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("slots", &self.slots)
            .field("pending", &self.pending.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Cloneable entry point to a running [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl DispatcherHandle {
    /// Transfers an accepted connection to the pool.
    pub fn accept<I: AsyncIo + 'static>(&self, io: I, addr: impl Into<String>) -> Result<(), DispatchError> {
        self.accept_boxed(Box::new(io), addr)
    }

    /// Like [`DispatcherHandle::accept`], for a stream that is already boxed.
    pub fn accept_boxed(&self, io: BoxIo, addr: impl Into<String>) -> Result<(), DispatchError> {
        self.send(Command::Accept(Assignment::new(io, addr.into())))
    }

    /// Replaces every worker of the pool.
    pub fn reload(&self) -> Result<(), DispatchError> {
        self.send(Command::Reload)
    }

    pub async fn status(&self) -> Result<PoolStatus, DispatchError> {
        let (reply, receiver) = oneshot::channel();
        self.send(Command::Status(reply))?;
        receiver.await.map_err(|_| DispatchError::Stopped)
    }

    fn send(&self, command: Command) -> Result<(), DispatchError> {
        self.commands.send(command).map_err(|_| DispatchError::Stopped)
    }
}
