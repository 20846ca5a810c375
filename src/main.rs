//! vote-worker entry point.
//!
//! Connects to PostgreSQL and Redis (waiting for each as long as needed),
//! optionally starts the results endpoint, then runs the consumer loop
//! until Ctrl-C.

use tracing_subscriber::EnvFilter;

use vote_worker::api;
use vote_worker::app_state::AppState;
use vote_worker::config::WorkerConfig;
use vote_worker::persistence::PostgresStore;
use vote_worker::queue::RedisQueue;
use vote_worker::service::{Connector, TokioSleeper, Worker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let config = WorkerConfig::from_env()?;
    tracing::info!(queue = %config.queue_key, "starting vote-worker");
    let policy = config.retry_policy();

    // Connect dependencies, database first
    let mut database = Connector::new("database", policy, TokioSleeper);
    let store = PostgresStore::connect(&config, &mut database).await?;

    let mut redis = Connector::new("Redis", policy, TokioSleeper);
    let queue = RedisQueue::connect(&config, &mut redis).await?;

    if config.results_enabled {
        let state = AppState::new(store.clone(), &config.results_options);
        let addr = config.listen_addr;
        tokio::spawn(async move {
            if let Err(err) = api::serve(addr, state).await {
                tracing::error!(error = %err, "results endpoint stopped");
            }
        });
    }

    let mut worker = Worker::new(queue, store, TokioSleeper, config.poll_interval());
    worker.run(shutdown_signal()).await;

    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` sets the filter (default
/// `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
