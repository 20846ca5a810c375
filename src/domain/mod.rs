//! Domain layer: vote events, the payload normalizer, and tallies.
//!
//! Nothing in this module performs I/O. [`VoteEvent::parse`] is the vote
//! normalizer; [`Tally`] is the aggregate shape read back from the store.

pub mod tally;
pub mod vote;

pub use tally::Tally;
pub use vote::VoteEvent;
