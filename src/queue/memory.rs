//! In-process FIFO queue.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::VoteQueue;
use crate::error::WorkerError;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<String>,
    dead_letters: Vec<String>,
    unavailable: bool,
}

/// Cloneable in-memory queue. Clones share the same list, so a test can
/// keep one handle as the producer while the worker owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    state: Arc<Mutex<QueueState>>,
}

impl MemoryQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a payload at the tail (producer side).
    pub async fn push(&self, payload: impl Into<String>) {
        self.state.lock().await.pending.push_back(payload.into());
    }

    /// Number of payloads still pending.
    pub async fn len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Whether no payloads are pending.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.pending.is_empty()
    }

    /// Payloads parked through [`VoteQueue::dead_letter`], oldest first.
    pub async fn dead_letters(&self) -> Vec<String> {
        self.state.lock().await.dead_letters.clone()
    }

    /// Simulates the queue service going away (or coming back).
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }
}

impl VoteQueue for MemoryQueue {
    async fn pop_next(&mut self) -> Result<Option<String>, WorkerError> {
        let mut state = self.state.lock().await;
        if state.unavailable {
            return Err(WorkerError::Queue("queue unavailable".to_string()));
        }
        Ok(state.pending.pop_front())
    }

    async fn dead_letter(&mut self, payload: &str) -> Result<(), WorkerError> {
        let mut state = self.state.lock().await;
        if state.unavailable {
            return Err(WorkerError::Queue("queue unavailable".to_string()));
        }
        state.dead_letters.push(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pops_in_insertion_order() {
        let mut queue = MemoryQueue::new();
        queue.push("first").await;
        queue.push("second").await;

        assert_eq!(queue.pop_next().await.ok().flatten().as_deref(), Some("first"));
        assert_eq!(queue.pop_next().await.ok().flatten().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn empty_queue_returns_none() {
        let mut queue = MemoryQueue::new();
        assert!(matches!(queue.pop_next().await, Ok(None)));
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn clones_share_the_list() {
        let producer = MemoryQueue::new();
        let mut consumer = producer.clone();
        producer.push("x").await;
        assert_eq!(consumer.pop_next().await.ok().flatten().as_deref(), Some("x"));
        assert_eq!(producer.len().await, 0);
    }

    #[tokio::test]
    async fn unavailable_queue_errors_without_losing_payloads() {
        let mut queue = MemoryQueue::new();
        queue.push("kept").await;
        queue.set_unavailable(true).await;
        assert!(matches!(queue.pop_next().await, Err(WorkerError::Queue(_))));

        queue.set_unavailable(false).await;
        assert_eq!(queue.pop_next().await.ok().flatten().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn dead_letters_are_recorded() {
        let mut queue = MemoryQueue::new();
        assert!(queue.dead_letter("bad").await.is_ok());
        assert_eq!(queue.dead_letters().await, vec!["bad".to_string()]);
    }
}
