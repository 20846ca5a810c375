//! Startup connection state machine.
//!
//! Neither the queue nor the store is guaranteed to be up when the worker
//! starts. A [`Connector`] keeps calling a connect function, logging a
//! wait notice and sleeping a fixed delay between attempts, until it
//! succeeds or its [`RetryPolicy`] is exhausted.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use super::Sleeper;
use crate::error::WorkerError;

/// Fixed-delay retry policy for startup connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: Duration,
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retries forever with a fixed `delay`.
    #[must_use]
    pub const fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Gives up after `max_attempts` attempts (at least one).
    #[must_use]
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    /// Delay between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Attempt ceiling, or `None` when retrying forever.
    #[must_use]
    pub const fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Observable state of a [`Connector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No attempt made yet.
    Idle,
    /// An attempt is in flight (1-based).
    Connecting {
        /// Current attempt number.
        attempt: u32,
    },
    /// Connected; `attempts` includes the successful one.
    Connected {
        /// Total attempts made.
        attempts: u32,
    },
    /// Gave up. Only reachable with a bounded policy.
    Failed {
        /// Total attempts made.
        attempts: u32,
    },
}

/// Drives one dependency from [`ConnectionState::Idle`] to
/// [`ConnectionState::Connected`] (or [`ConnectionState::Failed`]).
#[derive(Debug)]
pub struct Connector<Z> {
    dependency: &'static str,
    policy: RetryPolicy,
    sleeper: Z,
    state: ConnectionState,
}

impl<Z: Sleeper> Connector<Z> {
    /// Creates a connector for the named dependency.
    #[must_use]
    pub const fn new(dependency: &'static str, policy: RetryPolicy, sleeper: Z) -> Self {
        Self {
            dependency,
            policy,
            sleeper,
            state: ConnectionState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Calls `attempt` until it returns `Ok`, sleeping the policy delay
    /// after every failure.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Connect`] once a bounded policy runs out of
    /// attempts. An unbounded policy never returns an error.
    pub async fn establish<T, E, F, Fut>(&mut self, mut attempt: F) -> Result<T, WorkerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let dependency = self.dependency;
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            self.state = ConnectionState::Connecting { attempt: attempts };

            match attempt().await {
                Ok(connection) => {
                    self.state = ConnectionState::Connected { attempts };
                    tracing::info!(dependency, attempts, "connected");
                    return Ok(connection);
                }
                Err(err) if self.policy.exhausted(attempts) => {
                    self.state = ConnectionState::Failed { attempts };
                    tracing::error!(dependency, attempts, error = %err, "giving up");
                    return Err(WorkerError::Connect {
                        dependency,
                        attempts,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        dependency,
                        attempt = attempts,
                        error = %err,
                        "Waiting for {dependency}..."
                    );
                    self.sleeper.sleep(self.policy.delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::service::RecordingSleeper;

    const DELAY: Duration = Duration::from_secs(1);

    /// Fails the first `failures` calls, then succeeds with the call number.
    fn flaky(failures: u32) -> impl FnMut() -> std::future::Ready<Result<u32, String>> {
        let mut calls = 0;
        move || {
            calls += 1;
            if calls <= failures {
                std::future::ready(Err(format!("refused #{calls}")))
            } else {
                std::future::ready(Ok(calls))
            }
        }
    }

    #[tokio::test]
    async fn first_attempt_success_never_sleeps() {
        let sleeper = RecordingSleeper::new();
        let mut connector =
            Connector::new("database", RetryPolicy::unbounded(DELAY), sleeper.clone());
        assert_eq!(connector.state(), ConnectionState::Idle);

        let Ok(value) = connector.establish(flaky(0)).await else {
            panic!("expected connection");
        };
        assert_eq!(value, 1);
        assert_eq!(connector.state(), ConnectionState::Connected { attempts: 1 });
        assert!(sleeper.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn unbounded_policy_waits_until_dependency_appears() {
        let sleeper = RecordingSleeper::new();
        let mut connector =
            Connector::new("Redis", RetryPolicy::unbounded(DELAY), sleeper.clone());

        let Ok(value) = connector.establish(flaky(25)).await else {
            panic!("unbounded policy must not fail");
        };
        assert_eq!(value, 26);
        assert_eq!(connector.state(), ConnectionState::Connected { attempts: 26 });
        assert_eq!(sleeper.recorded().await, vec![DELAY; 25]);
    }

    #[tokio::test]
    async fn bounded_policy_gives_up() {
        let sleeper = RecordingSleeper::new();
        let mut connector =
            Connector::new("database", RetryPolicy::bounded(DELAY, 3), sleeper.clone());

        let result = connector.establish(flaky(10)).await;
        let Err(WorkerError::Connect {
            dependency,
            attempts,
        }) = result
        else {
            panic!("expected connect error");
        };
        assert_eq!(dependency, "database");
        assert_eq!(attempts, 3);
        assert_eq!(connector.state(), ConnectionState::Failed { attempts: 3 });
        // No sleep after the final attempt.
        assert_eq!(sleeper.recorded().await.len(), 2);
    }

    #[tokio::test]
    async fn bounded_policy_succeeds_within_budget() {
        let sleeper = RecordingSleeper::new();
        let mut connector = Connector::new("Redis", RetryPolicy::bounded(DELAY, 3), sleeper);

        let result = connector.establish(flaky(2)).await;
        assert!(matches!(result, Ok(3)));
        assert_eq!(connector.state(), ConnectionState::Connected { attempts: 3 });
    }

    #[test]
    fn bounded_policy_allows_at_least_one_attempt() {
        let policy = RetryPolicy::bounded(DELAY, 0);
        assert_eq!(policy.max_attempts(), Some(1));
        assert!(!policy.exhausted(0));
        assert!(policy.exhausted(1));
    }

    #[tokio::test]
    async fn setup_failure_after_connect_retries_whole_attempt() {
        let sleeper = RecordingSleeper::new();
        let mut connector =
            Connector::new("database", RetryPolicy::unbounded(DELAY), sleeper.clone());
        let mut connects = 0_u32;
        let mut schema_failures = 1_u32;

        let result = connector
            .establish(|| {
                connects += 1;
                let pool = connects;
                // Connecting succeeds; table creation fails once.
                let outcome = if schema_failures > 0 {
                    schema_failures -= 1;
                    Err("relation setup failed")
                } else {
                    Ok(pool)
                };
                std::future::ready(outcome)
            })
            .await;

        assert!(matches!(result, Ok(2)));
        assert_eq!(connects, 2);
        assert_eq!(connector.state(), ConnectionState::Connected { attempts: 2 });
        assert_eq!(sleeper.recorded().await, vec![DELAY]);
    }
}
