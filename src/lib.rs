//! # vote-worker
//!
//! Queue-consuming vote worker. Producers push JSON vote payloads onto a
//! Redis list; this worker pops them, validates them, and keeps exactly
//! one current vote per voter in PostgreSQL. A small read-only endpoint
//! reports the per-choice tally.
//!
//! ## Architecture
//!
//! ```text
//! Producer ──► Redis list "votes"
//!                 │
//!                 ├── RedisQueue (queue/)
//!                 │
//!                 ├── Worker (service/) ── VoteEvent::parse (domain/)
//!                 │
//!                 ├── PostgresStore (persistence/)
//!                 │
//!                 └── PostgreSQL "votes" ◄── GET /api/votes (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod queue;
pub mod service;
