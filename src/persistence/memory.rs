//! In-process vote store with the same upsert semantics as PostgreSQL.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{VoteRecord, VoteStore};
use crate::domain::{Tally, VoteEvent};
use crate::error::WorkerError;

#[derive(Debug, Default)]
struct StoreState {
    votes: HashMap<String, String>,
    writes: u64,
    unavailable: bool,
}

/// Cloneable in-memory store. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of voters with a current vote.
    pub async fn len(&self) -> usize {
        self.state.read().await.votes.len()
    }

    /// Whether no votes have been recorded.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.votes.is_empty()
    }

    /// Number of successful upserts, including overwrites.
    pub async fn writes(&self) -> u64 {
        self.state.read().await.writes
    }

    /// All records, ordered by voter id.
    pub async fn records(&self) -> Vec<VoteRecord> {
        let state = self.state.read().await;
        let mut records: Vec<VoteRecord> = state
            .votes
            .iter()
            .map(|(voter_id, choice)| VoteRecord {
                voter_id: voter_id.clone(),
                choice: choice.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.voter_id.cmp(&b.voter_id));
        records
    }

    /// Simulates the database going away (or coming back).
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }
}

fn unavailable() -> WorkerError {
    WorkerError::Store("database unavailable".to_string())
}

impl VoteStore for MemoryStore {
    async fn upsert(&self, event: &VoteEvent) -> Result<(), WorkerError> {
        let mut state = self.state.write().await;
        if state.unavailable {
            return Err(unavailable());
        }
        state
            .votes
            .insert(event.voter_id().to_string(), event.choice().to_string());
        state.writes = state.writes.saturating_add(1);
        Ok(())
    }

    async fn find(&self, voter_id: &str) -> Result<Option<VoteRecord>, WorkerError> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(unavailable());
        }
        Ok(state.votes.get(voter_id).map(|choice| VoteRecord {
            voter_id: voter_id.to_string(),
            choice: choice.clone(),
        }))
    }

    async fn tally(&self) -> Result<Tally, WorkerError> {
        let state = self.state.read().await;
        if state.unavailable {
            return Err(unavailable());
        }
        let mut tally = Tally::new();
        for choice in state.votes.values() {
            tally.increment(choice);
        }
        Ok(tally)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn vote(voter_id: &str, choice: &str) -> VoteEvent {
        let Ok(event) = VoteEvent::new(voter_id, choice) else {
            panic!("valid vote rejected");
        };
        event
    }

    #[tokio::test]
    async fn repeated_upserts_keep_one_record_with_last_choice() {
        let store = MemoryStore::new();
        for choice in ["a", "b", "a", "c"] {
            assert!(store.upsert(&vote("v", choice)).await.is_ok());
        }

        assert_eq!(store.len().await, 1);
        assert_eq!(store.writes().await, 4);
        let Ok(Some(record)) = store.find("v").await else {
            panic!("record missing");
        };
        assert_eq!(record.choice, "c");
    }

    #[tokio::test]
    async fn tally_counts_current_votes_only() {
        let store = MemoryStore::new();
        for (voter, choice) in [("1", "a"), ("2", "b"), ("1", "b")] {
            assert!(store.upsert(&vote(voter, choice)).await.is_ok());
        }

        let Ok(tally) = store.tally().await else {
            panic!("tally failed");
        };
        assert_eq!(tally.count("a"), 0);
        assert_eq!(tally.count("b"), 2);
    }

    #[tokio::test]
    async fn unavailable_store_rejects_writes() {
        let store = MemoryStore::new();
        store.set_unavailable(true).await;
        assert!(matches!(
            store.upsert(&vote("1", "a")).await,
            Err(WorkerError::Store(_))
        ));
        assert!(store.tally().await.is_err());

        store.set_unavailable(false).await;
        assert!(store.is_empty().await);
        assert!(store.upsert(&vote("1", "a")).await.is_ok());
    }

    #[tokio::test]
    async fn find_unknown_voter_is_none() {
        let store = MemoryStore::new();
        assert!(matches!(store.find("nobody").await, Ok(None)));
    }
}
