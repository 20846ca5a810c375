//! Shared application state injected into the results handlers.

use std::sync::Arc;

use crate::domain::Tally;

/// Shared state available to all handlers via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState<S> {
    /// Store the tally is read from.
    pub store: S,
    /// Choices always present in the tally, even with no votes.
    pub options: Arc<[String]>,
}

impl<S> AppState<S> {
    /// Creates state over `store`, reporting `options` even at zero.
    #[must_use]
    pub fn new(store: S, options: &[String]) -> Self {
        Self {
            store,
            options: Arc::from(options),
        }
    }

    /// A tally with every configured option at zero.
    #[must_use]
    pub fn empty_tally(&self) -> Tally {
        Tally::with_options(self.options.iter().cloned())
    }
}
