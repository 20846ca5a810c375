//! Aggregate per-choice vote counts.

use std::collections::BTreeMap;

use serde::Serialize;

/// Count of current votes per choice.
///
/// Serializes as a flat JSON object (`{"a": 0, "b": 1}`), which is the
/// shape the results page expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, i64>);

impl Tally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tally with every given choice present at zero.
    #[must_use]
    pub fn with_options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(options.into_iter().map(|o| (o.into(), 0)).collect())
    }

    /// Adds one vote for a choice.
    pub fn increment(&mut self, choice: &str) {
        *self.0.entry(choice.to_string()).or_insert(0) += 1;
    }

    /// Returns the count for a choice (0 if never seen).
    #[must_use]
    pub fn count(&self, choice: &str) -> i64 {
        self.0.get(choice).copied().unwrap_or(0)
    }

    /// Total number of votes across all choices.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    /// Overlays `other` onto `self`, keeping zero-count options of `self`.
    #[must_use]
    pub fn merged(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl FromIterator<(String, i64)> for Tally {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
