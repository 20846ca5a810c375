//! PostgreSQL implementation of the vote store.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{VoteRecord, VoteStore};
use crate::config::WorkerConfig;
use crate::domain::{Tally, VoteEvent};
use crate::error::WorkerError;
use crate::service::{Connector, Sleeper};

const CREATE_VOTES_TABLE: &str = "CREATE TABLE IF NOT EXISTS votes (\
     id VARCHAR(255) NOT NULL UNIQUE, \
     vote VARCHAR(255) NOT NULL\
     )";

const UPSERT_VOTE: &str = "INSERT INTO votes (id, vote) VALUES ($1, $2) \
     ON CONFLICT (id) DO UPDATE SET vote = EXCLUDED.vote";

/// PostgreSQL-backed vote store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps an existing connection pool. Does not touch the schema.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to PostgreSQL and makes sure the `votes` table exists,
    /// retrying both steps together through `connector`.
    ///
    /// A pool that connects but cannot create the table counts as a failed
    /// attempt, so an unbounded policy blocks here until both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Connect`] if a bounded retry policy gives up.
    pub async fn connect<Z: Sleeper>(
        config: &WorkerConfig,
        connector: &mut Connector<Z>,
    ) -> Result<Self, WorkerError> {
        let options = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs));
        let url = config.database_url.as_str();

        let pool = connector
            .establish(|| {
                let options = options.clone();
                async move {
                    let pool = options.connect(url).await?;
                    create_votes_table(&pool).await?;
                    Ok::<_, sqlx::Error>(pool)
                }
            })
            .await?;

        Ok(Self::new(pool))
    }
}

/// Creates the `votes` table if absent. Safe to call repeatedly.
async fn create_votes_table(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_VOTES_TABLE).execute(pool).await?;
    Ok(())
}

impl VoteStore for PostgresStore {
    async fn upsert(&self, event: &VoteEvent) -> Result<(), WorkerError> {
        sqlx::query(UPSERT_VOTE)
            .bind(event.voter_id())
            .bind(event.choice())
            .execute(&self.pool)
            .await
            .map_err(|e| WorkerError::Store(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, voter_id: &str) -> Result<Option<VoteRecord>, WorkerError> {
        let row = sqlx::query_as::<_, (String, String)>("SELECT id, vote FROM votes WHERE id = $1")
            .bind(voter_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WorkerError::Store(e.to_string()))?;

        Ok(row.map(|(voter_id, choice)| VoteRecord { voter_id, choice }))
    }

    async fn tally(&self) -> Result<Tally, WorkerError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT vote, COUNT(id) AS count FROM votes GROUP BY vote",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WorkerError::Store(e.to_string()))?;

        Ok(rows.into_iter().collect())
    }
}
