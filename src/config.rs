//! Worker configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparsable values fall
//! back to defaults matching the compose deployment (`db`, `redis`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::WorkerError;
use crate::service::RetryPolicy;

/// Top-level worker configuration.
///
/// Loaded once at startup via [`WorkerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Timeout in seconds for a single database connection attempt.
    pub database_connect_timeout_secs: u64,

    /// Redis connection URL.
    pub redis_url: String,

    /// Redis list holding pending vote payloads.
    pub queue_key: String,

    /// Optional Redis list receiving payloads the worker dropped.
    pub dead_letter_key: Option<String>,

    /// Milliseconds the consumer loop sleeps before each poll.
    pub poll_interval_ms: u64,

    /// Milliseconds between startup connection attempts.
    pub connect_retry_delay_ms: u64,

    /// Attempts before giving up on a dependency (0 = retry forever).
    pub connect_max_attempts: u32,

    /// Whether to serve the results endpoint alongside the worker.
    pub results_enabled: bool,

    /// Socket address the results endpoint binds to.
    pub listen_addr: SocketAddr,

    /// Choices always reported by the results endpoint, even at zero.
    pub results_options: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://postgres:postgres@db/postgres".to_string(),
            database_max_connections: 5,
            database_connect_timeout_secs: 5,
            redis_url: "redis://redis/".to_string(),
            queue_key: "votes".to_string(),
            dead_letter_key: None,
            poll_interval_ms: 100,
            connect_retry_delay_ms: 1000,
            connect_max_attempts: 0,
            results_enabled: true,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 4000)),
            results_options: vec!["a".to_string(), "b".to_string()],
        }
    }
}

impl WorkerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to [`WorkerConfig::default`] values when a variable is
    /// not set. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Config`] if `LISTEN_ADDR` is set but cannot
    /// be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, WorkerError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| WorkerError::Config(format!("LISTEN_ADDR `{raw}`: {e}")))?,
            Err(_) => defaults.listen_addr,
        };

        let dead_letter_key = std::env::var("QUEUE_DEAD_LETTER_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let results_options = std::env::var("RESULTS_OPTIONS")
            .map(|raw| parse_list(&raw))
            .unwrap_or(defaults.results_options);

        let config = Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: parse_env(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            database_connect_timeout_secs: parse_env(
                "DATABASE_CONNECT_TIMEOUT_SECS",
                defaults.database_connect_timeout_secs,
            ),
            redis_url: std::env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            queue_key: std::env::var("QUEUE_KEY").unwrap_or(defaults.queue_key),
            dead_letter_key,
            poll_interval_ms: parse_env("POLL_INTERVAL_MS", defaults.poll_interval_ms),
            connect_retry_delay_ms: parse_env(
                "CONNECT_RETRY_DELAY_MS",
                defaults.connect_retry_delay_ms,
            ),
            connect_max_attempts: parse_env("CONNECT_MAX_ATTEMPTS", defaults.connect_max_attempts),
            results_enabled: parse_env_bool("RESULTS_ENABLED", defaults.results_enabled),
            listen_addr,
            results_options,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks settings that are individually valid but conflict.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Config`] if the dead-letter list is the
    /// queue itself, which would re-deliver every dropped payload forever.
    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.dead_letter_key.as_deref() == Some(self.queue_key.as_str()) {
            return Err(WorkerError::Config(format!(
                "QUEUE_DEAD_LETTER_KEY must differ from QUEUE_KEY (`{}`)",
                self.queue_key
            )));
        }
        Ok(())
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Startup retry policy shared by the database and queue connectors.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::from_millis(self.connect_retry_delay_ms);
        match self.connect_max_attempts {
            0 => RetryPolicy::unbounded(delay),
            n => RetryPolicy::bounded(delay, n),
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw == "1" || raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw == "0" || raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Splits a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_compose_hosts() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.queue_key, "votes");
        assert_eq!(cfg.poll_interval(), Duration::from_millis(100));
        assert_eq!(cfg.results_options, vec!["a", "b"]);
        assert!(cfg.dead_letter_key.is_none());
    }

    #[test]
    fn zero_attempts_means_retry_forever() {
        let cfg = WorkerConfig::default();
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts(), None);
        assert_eq!(policy.delay(), Duration::from_secs(1));
    }

    #[test]
    fn positive_attempts_bound_the_policy() {
        let cfg = WorkerConfig {
            connect_max_attempts: 3,
            connect_retry_delay_ms: 50,
            ..WorkerConfig::default()
        };
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts(), Some(3));
        assert_eq!(policy.delay(), Duration::from_millis(50));
    }

    #[test]
    fn booleans_ignore_case() {
        for raw in ["true", "TRUE", "True", "1", " tRuE "] {
            assert_eq!(parse_bool(raw), Some(true), "{raw:?}");
        }
        for raw in ["false", "FALSE", "False", "0"] {
            assert_eq!(parse_bool(raw), Some(false), "{raw:?}");
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn dead_letter_key_must_differ_from_queue_key() {
        let cfg = WorkerConfig {
            dead_letter_key: Some("votes".to_string()),
            ..WorkerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(WorkerError::Config(_))));

        let cfg = WorkerConfig {
            dead_letter_key: Some("votes:dead".to_string()),
            ..WorkerConfig::default()
        };
        assert!(cfg.validate().is_ok());
        assert!(WorkerConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_list_trims_and_skips_blanks() {
        assert_eq!(parse_list(" cats, dogs ,,"), vec!["cats", "dogs"]);
        assert!(parse_list("").is_empty());
    }
}
