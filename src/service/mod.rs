//! Service layer: startup connections and the consumer loop.
//!
//! [`Connector`] brings each dependency up with fixed-delay retries;
//! [`Worker`] then drains the queue into the store until shutdown.

pub mod connect;
pub mod consumer;
pub mod sleeper;

pub use connect::{ConnectionState, Connector, RetryPolicy};
pub use consumer::{TickOutcome, Worker, WorkerPhase, WorkerStats};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
