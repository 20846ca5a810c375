//! Queue layer: the pending-vote list shared with producers.
//!
//! Producers right-push JSON payloads onto a list; the worker pops from
//! the left, so the list behaves as a FIFO. [`VoteQueue`] is the seam the
//! consumer loop depends on. [`RedisQueue`] is the production
//! implementation, and [`MemoryQueue`] is an in-process one for tests.

pub mod memory;
pub mod redis;

use std::future::Future;

pub use self::memory::MemoryQueue;
pub use self::redis::RedisQueue;
use crate::error::WorkerError;

/// Source of raw vote payloads.
pub trait VoteQueue: Send {
    /// Pops the oldest pending payload without blocking.
    ///
    /// `Ok(None)` means the queue is currently empty, which is the
    /// normal outcome under light load.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Queue`] if the queue service fails.
    fn pop_next(&mut self) -> impl Future<Output = Result<Option<String>, WorkerError>> + Send;

    /// Parks a payload the worker gave up on.
    ///
    /// Implementations without a dead-letter destination drop it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Queue`] if the queue service fails.
    fn dead_letter(&mut self, payload: &str) -> impl Future<Output = Result<(), WorkerError>> + Send;
}
