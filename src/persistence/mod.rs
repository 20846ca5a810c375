//! Persistence layer: one current vote per voter.
//!
//! Provides the [`VoteStore`] trait for durable storage of votes. The
//! concrete implementation uses `sqlx::PgPool` for async PostgreSQL
//! access; [`MemoryStore`] has the same semantics without a database.

pub mod memory;
pub mod models;
pub mod postgres;

use std::future::Future;

pub use memory::MemoryStore;
pub use models::VoteRecord;
pub use postgres::PostgresStore;

use crate::domain::{Tally, VoteEvent};
use crate::error::WorkerError;

/// Durable store keyed by voter id.
///
/// # Invariant
///
/// At most one record exists per voter. [`VoteStore::upsert`] inserts a
/// record if the voter has none and overwrites the choice otherwise, in
/// a single atomic step.
pub trait VoteStore: Send + Sync {
    /// Records `event` as the voter's current vote.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Store`] on database failure.
    fn upsert(&self, event: &VoteEvent) -> impl Future<Output = Result<(), WorkerError>> + Send;

    /// Looks up a voter's current record.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Store`] on database failure.
    fn find(
        &self,
        voter_id: &str,
    ) -> impl Future<Output = Result<Option<VoteRecord>, WorkerError>> + Send;

    /// Counts current votes per choice. Choices with no votes are absent.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Store`] on database failure.
    fn tally(&self) -> impl Future<Output = Result<Tally, WorkerError>> + Send;
}
