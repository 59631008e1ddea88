//! Tournament model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LeagueId, MatchRecord, PlayerSlot, PlayoffBracket, TournamentId};

/// Tournament format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    GroupOnly,
    GroupsWithPlayoffs,
    PlayoffsOnly,
}

/// Tournament lifecycle status. Scoring only applies once completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Setup,
    Active,
    Completed,
}

/// One row of a group's ranked standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStanding {
    pub player: PlayerSlot,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub legs_won: u32,
    #[serde(default)]
    pub legs_lost: u32,
    #[serde(default)]
    pub average: f64,
}

impl GroupStanding {
    /// Legs won minus legs lost, the second-order tie-breaker.
    pub fn leg_difference(&self) -> i64 {
        i64::from(self.legs_won) - i64::from(self.legs_lost)
    }
}

/// A group with its ranked standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub standings: Vec<GroupStanding>,
}

/// A tournament record. The playoff bracket here is the structural snapshot;
/// live match state is fetched separately from the match store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    #[serde(default)]
    pub status: TournamentStatus,

    /// League this tournament is linked to, if any. A tournament belongs to
    /// at most one league.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_id: Option<LeagueId>,

    /// Set once league points have been recorded; cleared on (re)link so the
    /// automatic recompute paths pick the tournament up again.
    #[serde(default)]
    pub league_points_calculated: bool,

    /// Full participant list. Used as the last-resort placement fallback for
    /// players absent from both playoff and group data.
    #[serde(default)]
    pub players: Vec<PlayerSlot>,

    #[serde(default)]
    pub groups: Vec<Group>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playoffs: Option<PlayoffBracket>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }

    /// Whether a non-empty playoff bracket is present. Placement extraction
    /// branches on this, not on the format flag, so a playoff-format
    /// tournament with no bracket falls back to the group path.
    pub fn has_playoffs(&self) -> bool {
        self.playoffs
            .as_ref()
            .map(|b| !b.rounds.is_empty())
            .unwrap_or(false)
    }
}

/// A tournament together with the live match rows for its bracket, as read
/// from the store in two unsynchronized reads.
#[derive(Debug, Clone)]
pub struct TournamentData {
    pub tournament: Tournament,
    pub live_matches: Vec<MatchRecord>,
}
