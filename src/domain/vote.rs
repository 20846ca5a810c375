//! Vote events and the normalizer that builds them from queue payloads.
//!
//! Producers push compact JSON objects of the form
//! `{"vote":"a","voter_id":"123"}`. [`VoteEvent::parse`] is the only way
//! to obtain a [`VoteEvent`], so every event that reaches the store has
//! both fields present and non-empty.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Field names as they appear on the wire.
const VOTE_FIELD: &str = "vote";
const VOTER_ID_FIELD: &str = "voter_id";

/// Wire shape of a queue payload. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct WirePayload {
    vote: Option<String>,
    voter_id: Option<String>,
}

/// A validated vote: one voter selecting one choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VoteEvent {
    voter_id: String,
    choice: String,
}

impl VoteEvent {
    /// Builds an event from already-known fields.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyField`] if either value is empty or
    /// whitespace-only.
    pub fn new(voter_id: impl Into<String>, choice: impl Into<String>) -> Result<Self, ParseError> {
        let voter_id = voter_id.into();
        let choice = choice.into();
        if voter_id.trim().is_empty() {
            return Err(ParseError::EmptyField(VOTER_ID_FIELD));
        }
        if choice.trim().is_empty() {
            return Err(ParseError::EmptyField(VOTE_FIELD));
        }
        Ok(Self { voter_id, choice })
    }

    /// Parses a raw queue payload. Pure: performs no I/O.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Malformed`] if the payload is not a JSON object or a
    ///   field is not a string.
    /// - [`ParseError::MissingField`] if `vote` or `voter_id` is absent
    ///   (or `null`).
    /// - [`ParseError::EmptyField`] if either field is blank.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ParseError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(ParseError::Malformed("expected a JSON object".to_string()));
        }
        let wire =
            WirePayload::deserialize(value).map_err(|e| ParseError::Malformed(e.to_string()))?;

        let voter_id = wire.voter_id.ok_or(ParseError::MissingField(VOTER_ID_FIELD))?;
        let choice = wire.vote.ok_or(ParseError::MissingField(VOTE_FIELD))?;
        Self::new(voter_id, choice)
    }

    /// Opaque voter identifier.
    #[must_use]
    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }

    /// Selected option tag.
    #[must_use]
    pub fn choice(&self) -> &str {
        &self.choice
    }
}

impl fmt::Display for VoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.choice, self.voter_id)
    }
}
