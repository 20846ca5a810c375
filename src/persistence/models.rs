//! Database models.

use serde::{Deserialize, Serialize};

/// A row from the `votes` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Voter id (`id` column, unique).
    pub voter_id: String,
    /// Last applied choice (`vote` column).
    pub choice: String,
}
