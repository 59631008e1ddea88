//! Placement records.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// A participant's final rank in a tournament. Exactly one record per
/// participant; placement 1 is the champion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub player_id: PlayerId,
    /// Final rank, 1-based.
    pub placement: u32,
    /// Whether the player appeared in at least one playoff bracket match,
    /// regardless of how early they were eliminated.
    pub in_playoff: bool,
}

impl PlacementRecord {
    pub fn new(player_id: impl Into<PlayerId>, placement: u32, in_playoff: bool) -> Self {
        Self {
            player_id: player_id.into(),
            placement,
            in_playoff,
        }
    }
}
