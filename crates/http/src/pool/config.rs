use std::num::NonZeroUsize;

use crate::codec::DEFAULT_MAX_HEAD_BYTES;

const DEFAULT_WORKERS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(1);

/// Sizing of a worker pool.
///
/// ```
/// use std::num::NonZeroUsize;
/// use pool_http::pool::PoolConfig;
///
/// let config = PoolConfig::default()
///     .workers(NonZeroUsize::new(4).unwrap())
///     .max_pending(Some(128));
/// assert_eq!(config.worker_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    workers: NonZeroUsize,
    max_pending: Option<usize>,
    max_head_bytes: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { workers: DEFAULT_WORKERS, max_pending: None, max_head_bytes: DEFAULT_MAX_HEAD_BYTES }
    }
}

impl PoolConfig {
    /// Number of worker slots, fixed for the lifetime of the pool.
    pub fn workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    /// Upper bound of the pending queue; `None` leaves it unbounded.
    ///
    /// Connections arriving while the queue is full are answered with
    /// `429 Too Many Requests`.
    pub fn max_pending(mut self, max_pending: Option<usize>) -> Self {
        self.max_pending = max_pending;
        self
    }

    /// Largest request head, in bytes, a worker accepts.
    pub fn max_head_bytes(mut self, max_head_bytes: usize) -> Self {
        self.max_head_bytes = max_head_bytes;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers.get()
    }

    pub fn pending_limit(&self) -> Option<usize> {
        self.max_pending
    }

    pub fn head_limit(&self) -> usize {
        self.max_head_bytes
    }
}
