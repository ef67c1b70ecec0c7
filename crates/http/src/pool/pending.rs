use std::collections::VecDeque;

use super::message::Assignment;

/// FIFO of connections waiting for a free worker.
///
/// Unbounded unless a capacity is given; a full queue hands the assignment
/// back to the caller instead of growing.
#[derive(Debug)]
pub(crate) struct PendingQueue {
    queue: VecDeque<Assignment>,
    capacity: Option<usize>,
}

impl PendingQueue {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self { queue: VecDeque::new(), capacity }
    }

    pub(crate) fn push(&mut self, assignment: Assignment) -> Result<(), Assignment> {
        match self.capacity {
            Some(capacity) if self.queue.len() >= capacity => Err(assignment),
            _ => {
                self.queue.push_back(assignment);
                Ok(())
            }
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Assignment> {
        self.queue.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
