//! Redis implementation of the vote queue.

use std::fmt;

use ::redis::AsyncCommands;
use ::redis::aio::ConnectionManager;

use super::VoteQueue;
use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::service::{Connector, Sleeper};

/// Redis list-backed queue.
///
/// Uses a [`ConnectionManager`], which reconnects on its own after Redis
/// restarts; reads fail only while Redis is actually unreachable.
#[derive(Clone)]
pub struct RedisQueue {
    connection: ConnectionManager,
    key: String,
    dead_letter_key: Option<String>,
}

impl fmt::Debug for RedisQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisQueue")
            .field("key", &self.key)
            .field("dead_letter_key", &self.dead_letter_key)
            .finish_non_exhaustive()
    }
}

impl RedisQueue {
    /// Connects to Redis, retrying through `connector` until a `PING`
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Config`] if `REDIS_URL` is not a valid Redis
    /// URL, or [`WorkerError::Connect`] if a bounded retry policy gives up.
    pub async fn connect<Z: Sleeper>(
        config: &WorkerConfig,
        connector: &mut Connector<Z>,
    ) -> Result<Self, WorkerError> {
        let client = ::redis::Client::open(config.redis_url.as_str())
            .map_err(|e| WorkerError::Config(format!("REDIS_URL: {e}")))?;

        let connection = connector
            .establish(|| {
                let client = client.clone();
                async move {
                    let mut connection = client.get_connection_manager().await?;
                    let _: String = ::redis::cmd("PING").query_async(&mut connection).await?;
                    Ok::<_, ::redis::RedisError>(connection)
                }
            })
            .await?;

        tracing::info!(key = %config.queue_key, "consuming votes");
        Ok(Self {
            connection,
            key: config.queue_key.clone(),
            dead_letter_key: config.dead_letter_key.clone(),
        })
    }
}

impl VoteQueue for RedisQueue {
    async fn pop_next(&mut self) -> Result<Option<String>, WorkerError> {
        self.connection
            .lpop(&self.key, None)
            .await
            .map_err(|e| WorkerError::Queue(e.to_string()))
    }

    async fn dead_letter(&mut self, payload: &str) -> Result<(), WorkerError> {
        let Some(key) = &self.dead_letter_key else {
            return Ok(());
        };
        let _: i64 = self
            .connection
            .rpush(key, payload)
            .await
            .map_err(|e| WorkerError::Queue(e.to_string()))?;
        Ok(())
    }
}
