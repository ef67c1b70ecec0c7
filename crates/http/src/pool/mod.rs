//! Fixed-size worker pool.
//!
//! # Components
//!
//! - [`Dispatcher`]: owns the slot table and the FIFO of pending connections,
//!   and replaces the whole pool on reload
//! - [`DispatcherHandle`]: the cloneable way in, used by acceptors and signal
//!   handlers
//! - the worker runtime: one task per slot, serving one [`Connection`] at a
//!   time and reporting back with a [`WorkerMessage`]
//!
//! At most [`PoolConfig::worker_count`] connections are served at any instant.
//! Reload does not drain in-flight requests; their streams are dropped.
//!
//! [`Connection`]: crate::connection::Connection

mod config;
mod dispatcher;
mod message;
mod pending;
mod worker;

pub use config::PoolConfig;
pub use dispatcher::Dispatcher;
pub use dispatcher::DispatcherHandle;
pub use message::PoolStatus;
pub use message::SlotStatus;
pub use message::WorkerMessage;
