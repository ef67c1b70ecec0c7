//! The worker runtime.
//!
//! A worker is a tokio task that owns an assignment channel and serves the
//! connections it receives one after another. For every assignment it reports
//! exactly one [`WorkerMessage::Done`], preceded by a
//! [`WorkerMessage::Reload`] when the request asked for a pool reload.
//!
//! Handler errors and panics are answered with `500 Internal Server Error`.
//! Failures while reading the request head are only logged.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use http::StatusCode;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::message::{Assignment, WorkerEvent, WorkerMessage};
use crate::connection::{BoxIo, Connection};
use crate::handler::Handler;
use crate::protocol::RequestHead;

const RELOAD_RESPONSE: &str = "ok";

/// Handle to a running worker task. Dropping it aborts the task, abandoning
/// whatever connection it is serving.
#[derive(Debug)]
pub(crate) struct WorkerRuntime {
    slot: usize,
    generation: u64,
    sender: mpsc::UnboundedSender<Assignment>,
    task: JoinHandle<()>,
}

impl WorkerRuntime {
    pub(crate) fn spawn(
        slot: usize,
        generation: u64,
        handler: Arc<dyn Handler>,
        events: mpsc::UnboundedSender<WorkerEvent>,
        max_head_bytes: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = Worker { slot, generation, handler, events, max_head_bytes };
        let task = tokio::spawn(worker.run(receiver));
        Self { slot, generation, sender, task }
    }

    /// Moves `assignment` to the worker, or gives it back if the worker is gone.
    pub(crate) fn assign(&self, assignment: Assignment) -> Result<(), Assignment> {
        self.sender.send(assignment).map_err(|e| e.0)
    }
}

impl Drop for WorkerRuntime {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!(slot = self.slot, generation = self.generation, "terminate worker");
        }
        self.task.abort();
    }
}

struct Worker {
    slot: usize,
    generation: u64,
    handler: Arc<dyn Handler>,
    events: mpsc::UnboundedSender<WorkerEvent>,
    max_head_bytes: usize,
}

impl Worker {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<Assignment>) {
        trace!(slot = self.slot, generation = self.generation, "worker started");

        while let Some(Assignment { io, addr }) = receiver.recv().await {
            let reload = AssertUnwindSafe(self.serve(io, addr)).catch_unwind().await.unwrap_or_else(|panic| {
                error!(slot = self.slot, cause = panic_message(&*panic), "worker panicked while serving");
                false
            });

            if reload && !self.report(WorkerMessage::Reload) {
                break;
            }
            if !self.report(WorkerMessage::Done) {
                break;
            }
        }

        trace!(slot = self.slot, generation = self.generation, "worker stopped");
    }

    /// Returns false once the dispatcher is gone.
    fn report(&self, message: WorkerMessage) -> bool {
        let event = WorkerEvent { slot: self.slot, generation: self.generation, message };
        self.events.send(event).is_ok()
    }

    /// Serves one connection. Returns whether a pool reload was requested.
    async fn serve(&self, io: BoxIo, addr: String) -> bool {
        let mut connection = match Connection::open_with_limit(io, addr.as_str(), self.max_head_bytes).await {
            Ok(connection) => connection,
            Err(e) => {
                error!(slot = self.slot, addr = %addr, cause = %e, "failed to read request head");
                return false;
            }
        };

        // already answered or dropped while opening
        if !connection.is_reuseable() {
            return false;
        }

        if connection.head().is_some_and(RequestHead::is_reload) {
            info!(slot = self.slot, addr = %addr, "pool reload requested");
            if let Err(e) = connection.send(RELOAD_RESPONSE).await {
                warn!(addr = %addr, cause = %e, "failed to answer reload request");
            }
            return true;
        }

        let outcome = AssertUnwindSafe(self.handler.handle(&mut connection)).catch_unwind().await;
        let fault = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(panic) => Some(panic_message(&*panic).to_string()),
        };

        if let Some(message) = fault {
            warn!(slot = self.slot, addr = %addr, cause = %message, "handler failed");
            if connection.is_reuseable() {
                connection.reset().status(StatusCode::INTERNAL_SERVER_ERROR);
                if let Err(e) = connection.send(message).await {
                    warn!(addr = %addr, cause = %e, "failed to send error response");
                }
            }
        }

        connection.close().await;
        false
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "handler panicked"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxError;
    use crate::test_util::{connect, parse_response};
    use async_trait::async_trait;
    use tokio::io::AsyncReadExt;

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn handle(&self, connection: &mut Connection) -> Result<(), BoxError> {
            match connection.url()? {
                "/error" => Err("storage unavailable".into()),
                "/panic" => panic!("index out of bounds"),
                url => {
                    let url = url.to_string();
                    connection.send(url).await?;
                    Ok(())
                }
            }
        }
    }

    fn spawn_worker() -> (WorkerRuntime, mpsc::UnboundedReceiver<WorkerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let worker = WorkerRuntime::spawn(3, 7, Arc::new(Echo), events, 1024);
        (worker, receiver)
    }

    async fn assign(worker: &WorkerRuntime, request: &[u8]) -> tokio::io::DuplexStream {
        let (server, client) = connect(request).await;
        worker.assign(Assignment::new(Box::new(server), "127.0.0.1".to_string())).unwrap();
        client
    }

    async fn next_message(receiver: &mut mpsc::UnboundedReceiver<WorkerEvent>) -> WorkerMessage {
        let event = receiver.recv().await.unwrap();
        assert_eq!((event.slot, event.generation), (3, 7));
        event.message
    }

    #[tokio::test]
    async fn serves_and_reports_done() {
        let (worker, mut events) = spawn_worker();
        let mut client = assign(&worker, b"GET /hello HTTP/1.1\r\nHost: a\r\n\r\n").await;

        let response = parse_response(&mut client).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"/hello");
        assert_eq!(next_message(&mut events).await, WorkerMessage::Done);
    }

    #[tokio::test]
    async fn handler_error_becomes_500() {
        let (worker, mut events) = spawn_worker();
        let mut client = assign(&worker, b"GET /error HTTP/1.1\r\nHost: a\r\n\r\n").await;

        let response = parse_response(&mut client).await;
        assert_eq!(response.status, 500);
        assert_eq!(response.reason, "Internal Server Error");
        assert_eq!(response.body, b"storage unavailable");
        assert_eq!(next_message(&mut events).await, WorkerMessage::Done);
    }

    #[tokio::test]
    async fn handler_panic_becomes_500_and_worker_survives() {
        let (worker, mut events) = spawn_worker();
        let mut client = assign(&worker, b"GET /panic HTTP/1.1\r\nHost: a\r\n\r\n").await;

        let response = parse_response(&mut client).await;
        assert_eq!(response.status, 500);
        assert_eq!(response.body, b"index out of bounds");
        assert_eq!(next_message(&mut events).await, WorkerMessage::Done);

        let mut client = assign(&worker, b"GET /again HTTP/1.1\r\nHost: a\r\n\r\n").await;
        assert_eq!(parse_response(&mut client).await.body, b"/again");
        assert_eq!(next_message(&mut events).await, WorkerMessage::Done);
    }

    #[tokio::test]
    async fn reload_path_answers_ok_then_requests_reload() {
        let (worker, mut events) = spawn_worker();
        let mut client = assign(&worker, b"GET /__reload__ HTTP/1.1\r\nHost: a\r\n\r\n").await;

        let response = parse_response(&mut client).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"ok");
        assert_eq!(next_message(&mut events).await, WorkerMessage::Reload);
        assert_eq!(next_message(&mut events).await, WorkerMessage::Done);
    }

    #[tokio::test]
    async fn construction_fault_still_reports_done() {
        let (worker, mut events) = spawn_worker();
        let mut client = assign(&worker, b"GET / HTTP/1.1\r\nHost a\r\n\r\n").await;

        let mut written = Vec::new();
        client.read_to_end(&mut written).await.unwrap();
        assert!(written.is_empty());
        assert_eq!(next_message(&mut events).await, WorkerMessage::Done);
    }

    #[tokio::test]
    async fn malformed_request_line_reports_done_without_response() {
        let (worker, mut events) = spawn_worker();
        let mut client = assign(&worker, b"FROB /x\r\n\r\n").await;

        let mut written = Vec::new();
        client.read_to_end(&mut written).await.unwrap();
        assert!(written.is_empty());
        assert_eq!(next_message(&mut events).await, WorkerMessage::Done);
    }

    #[tokio::test]
    async fn dropping_runtime_abandons_connection() {
        let (events, mut receiver) = mpsc::unbounded_channel();
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let handler = {
            let gate = Arc::clone(&gate);
            crate::handler::make_handler(move |connection| {
                let gate = Arc::clone(&gate);
                async move {
                    let _permit = gate.acquire().await?;
                    connection.send("late").await?;
                    Ok::<_, BoxError>(())
                }
                .boxed()
            })
        };
        let worker = WorkerRuntime::spawn(0, 0, Arc::new(handler), events, 1024);
        let mut client = assign(&worker, b"GET / HTTP/1.1\r\nHost: a\r\n\r\n").await;

        tokio::task::yield_now().await;
        drop(worker);
        gate.add_permits(1);

        let mut written = Vec::new();
        client.read_to_end(&mut written).await.unwrap();
        assert!(written.is_empty());
        assert!(receiver.recv().await.is_none());
    }
}
