//! The vote consumer loop.
//!
//! A single task owns the queue and the store. Each iteration sleeps for
//! the poll interval, pops at most one payload, normalizes it, and
//! upserts it. No outcome of an iteration stops the loop: malformed
//! payloads are dropped, and store or queue failures are logged and the
//! loop polls again.
//!
//! Events for one voter are applied in the order they were dequeued.
//! Because the upsert is idempotent per voter, being killed between any
//! two steps can lose the in-flight event but never duplicates a record.

use std::future::Future;
use std::time::Duration;

use super::Sleeper;
use crate::domain::VoteEvent;
use crate::error::ParseError;
use crate::persistence::VoteStore;
use crate::queue::VoteQueue;

/// Lifecycle of a [`Worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Constructed with live connections; [`Worker::run`] not yet called.
    Ready,
    /// Inside [`Worker::run`].
    Polling,
    /// [`Worker::run`] returned after shutdown.
    Stopped,
}

/// What happened during one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The queue was empty.
    Idle,
    /// The vote was written to the store.
    Applied(VoteEvent),
    /// The payload was malformed and dropped.
    Rejected(ParseError),
    /// The vote was valid but the store write failed; it was dropped.
    StoreFailed(VoteEvent),
    /// Reading from the queue failed.
    QueueFailed,
}

/// Running counters, logged when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Queue reads attempted.
    pub polls: u64,
    /// Reads that found the queue empty.
    pub idle: u64,
    /// Votes written to the store.
    pub applied: u64,
    /// Malformed payloads dropped.
    pub rejected: u64,
    /// Valid votes lost to store failures.
    pub store_failures: u64,
    /// Failed queue reads.
    pub queue_failures: u64,
}

/// Queue → normalizer → store pipeline.
#[derive(Debug)]
pub struct Worker<Q, S, Z> {
    queue: Q,
    store: S,
    sleeper: Z,
    poll_interval: Duration,
    phase: WorkerPhase,
    stats: WorkerStats,
}

impl<Q, S, Z> Worker<Q, S, Z>
where
    Q: VoteQueue,
    S: VoteStore,
    Z: Sleeper,
{
    /// Creates a worker over already-connected adapters.
    #[must_use]
    pub fn new(queue: Q, store: S, sleeper: Z, poll_interval: Duration) -> Self {
        Self {
            queue,
            store,
            sleeper,
            poll_interval,
            phase: WorkerPhase::Ready,
            stats: WorkerStats::default(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> WorkerPhase {
        self.phase
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// One full iteration: sleep for the poll interval, then
    /// [`Worker::poll_once`].
    pub async fn tick(&mut self) -> TickOutcome {
        self.sleeper.sleep(self.poll_interval).await;
        self.poll_once().await
    }

    /// Pops and applies at most one payload, without sleeping.
    pub async fn poll_once(&mut self) -> TickOutcome {
        self.stats.polls = self.stats.polls.saturating_add(1);

        let payload = match self.queue.pop_next().await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                self.stats.idle = self.stats.idle.saturating_add(1);
                tracing::trace!("queue empty");
                return TickOutcome::Idle;
            }
            Err(err) => {
                self.stats.queue_failures = self.stats.queue_failures.saturating_add(1);
                tracing::error!(error = %err, "failed to read from queue");
                return TickOutcome::QueueFailed;
            }
        };

        let event = match VoteEvent::parse(&payload) {
            Ok(event) => event,
            Err(err) => {
                self.stats.rejected = self.stats.rejected.saturating_add(1);
                tracing::warn!(
                    error = %err,
                    payload = log_excerpt(&payload),
                    payload_len = payload.len(),
                    "dropping malformed vote payload"
                );
                self.dead_letter(&payload).await;
                return TickOutcome::Rejected(err);
            }
        };

        tracing::info!(
            voter_id = event.voter_id(),
            choice = event.choice(),
            "processing vote: {event}"
        );

        match self.store.upsert(&event).await {
            Ok(()) => {
                self.stats.applied = self.stats.applied.saturating_add(1);
                TickOutcome::Applied(event)
            }
            Err(err) => {
                self.stats.store_failures = self.stats.store_failures.saturating_add(1);
                tracing::error!(
                    voter_id = event.voter_id(),
                    choice = event.choice(),
                    error = %err,
                    "failed to record vote; dropping"
                );
                self.dead_letter(&payload).await;
                TickOutcome::StoreFailed(event)
            }
        }
    }

    /// Polls until `shutdown` resolves, then returns the final counters.
    ///
    /// Shutdown is only observed while sleeping between polls, so an
    /// event that has been popped is always carried through to the store.
    pub async fn run<F>(&mut self, shutdown: F) -> WorkerStats
    where
        F: Future<Output = ()>,
    {
        self.phase = WorkerPhase::Polling;
        tracing::info!(poll_interval = ?self.poll_interval, "worker polling");

        let mut shutdown = std::pin::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                () = self.sleeper.sleep(self.poll_interval) => {}
            }
            let _ = self.poll_once().await;
        }

        self.phase = WorkerPhase::Stopped;
        let stats = self.stats;
        tracing::info!(
            polls = stats.polls,
            applied = stats.applied,
            rejected = stats.rejected,
            store_failures = stats.store_failures,
            queue_failures = stats.queue_failures,
            "worker stopped"
        );
        stats
    }

    async fn dead_letter(&mut self, payload: &str) {
        if let Err(err) = self.queue.dead_letter(payload).await {
            tracing::error!(
                error = %err,
                payload = log_excerpt(payload),
                "failed to dead-letter payload"
            );
        }
    }
}

/// Longest payload prefix written to the log.
const LOG_PAYLOAD_LIMIT: usize = 256;

/// Cuts `payload` to at most [`LOG_PAYLOAD_LIMIT`] bytes on a char boundary.
fn log_excerpt(payload: &str) -> &str {
    let mut end = payload.len().min(LOG_PAYLOAD_LIMIT);
    while !payload.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    payload.get(..end).unwrap_or_default()
}
