//! Injectable delays.
//!
//! Both the startup retry loop and the consumer loop pause through a
//! [`Sleeper`] instead of calling `tokio::time::sleep` directly, so tests
//! can simulate unavailable dependencies without waiting in real time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

/// Something that can pause the current task.
pub trait Sleeper: Send + Sync {
    /// Suspends for (at least) `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that records requested delays and only yields to the scheduler.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Creates a sleeper with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far, in order.
    pub async fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().await.clone()
    }

    /// Sum of every delay requested so far.
    pub async fn total(&self) -> Duration {
        self.slept.lock().await.iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().await.push(duration);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_sleeper_does_not_wait() {
        let sleeper = RecordingSleeper::new();
        let started = tokio::time::Instant::now();
        sleeper.sleep(Duration::from_secs(3600)).await;
        sleeper.sleep(Duration::from_secs(1)).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(
            sleeper.recorded().await,
            vec![Duration::from_secs(3600), Duration::from_secs(1)]
        );
        assert_eq!(sleeper.total().await, Duration::from_secs(3601));
    }

    #[tokio::test]
    async fn clones_share_record() {
        let sleeper = RecordingSleeper::new();
        let clone = sleeper.clone();
        clone.sleep(Duration::from_millis(5)).await;
        assert_eq!(sleeper.recorded().await.len(), 1);
    }
}
