//! REST endpoint handlers.

pub mod results;
pub mod system;
