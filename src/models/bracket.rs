//! Playoff bracket models.
//!
//! The bracket exists in two overlapping representations:
//! - a structural snapshot embedded in the tournament record
//!   ([`PlayoffBracket`]), which owns topology (round membership, third-place
//!   flag) but may be stale for `status`/`result`;
//! - live per-match rows from the match store ([`MatchRecord`]), authoritative
//!   for `status`, `result` and player slots.
//!
//! The freshness overlay in `calculate::overlay` reconciles the two.

use serde::{Deserialize, Serialize};

use super::{MatchId, PlayerId, TournamentId};

/// A player slot in a match. Slots are nullable until the bracket fills in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub id: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PlayerSlot {
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// Match completion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Result of a completed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: PlayerId,
}

/// A match inside the bracket snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    pub player1: Option<PlayerSlot>,
    pub player2: Option<PlayerSlot>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
    /// Only set on the final round's third-place match.
    #[serde(default)]
    pub is_third_place_match: bool,
}

impl BracketMatch {
    pub fn new(id: impl Into<MatchId>) -> Self {
        Self {
            id: id.into(),
            player1: None,
            player2: None,
            status: MatchStatus::Pending,
            result: None,
            is_third_place_match: false,
        }
    }

    /// Whether this match has a usable outcome.
    pub fn is_decided(&self) -> bool {
        self.status == MatchStatus::Completed && self.result.is_some()
    }

    /// The loser of a decided match: whichever populated slot is not the
    /// winner. Returns `None` for undecided matches or missing slots.
    pub fn loser(&self) -> Option<PlayerId> {
        let winner = &self.result.as_ref()?.winner;
        if self.status != MatchStatus::Completed {
            return None;
        }
        match (&self.player1, &self.player2) {
            (Some(p1), _) if &p1.id == winner => self.player2.as_ref().map(|p| p.id.clone()),
            _ => self.player1.as_ref().map(|p| p.id.clone()),
        }
    }
}

/// One round of the bracket, earliest first in [`PlayoffBracket::rounds`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub matches: Vec<BracketMatch>,
}

/// The structural bracket snapshot stored on the tournament record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayoffBracket {
    #[serde(default)]
    pub rounds: Vec<BracketRound>,
}

impl PlayoffBracket {
    /// The last round, containing the final (and third-place match, if any).
    pub fn final_round(&self) -> Option<&BracketRound> {
        self.rounds.last()
    }

    /// The final: the last round's non-third-place match.
    pub fn final_match(&self) -> Option<&BracketMatch> {
        self.final_round()?
            .matches
            .iter()
            .find(|m| !m.is_third_place_match)
    }

    /// The third-place match, if the final round contains one.
    pub fn third_place_match(&self) -> Option<&BracketMatch> {
        self.final_round()?
            .matches
            .iter()
            .find(|m| m.is_third_place_match)
    }
}

/// A live match row from the authoritative match store. Always at least as
/// fresh as the snapshot for the fields it carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub player1: Option<PlayerSlot>,
    pub player2: Option<PlayerSlot>,
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decided_match(id: &str, p1: &str, p2: &str, winner: &str) -> BracketMatch {
        BracketMatch {
            id: id.into(),
            player1: Some(PlayerSlot::new(p1)),
            player2: Some(PlayerSlot::new(p2)),
            status: MatchStatus::Completed,
            result: Some(MatchResult {
                winner: winner.into(),
            }),
            is_third_place_match: false,
        }
    }

    #[test]
    fn test_loser_of_decided_match() {
        let m = decided_match("m1", "p1", "p2", "p1");
        assert_eq!(m.loser(), Some("p2".into()));

        let m = decided_match("m1", "p1", "p2", "p2");
        assert_eq!(m.loser(), Some("p1".into()));
    }

    #[test]
    fn test_loser_of_pending_match() {
        let mut m = decided_match("m1", "p1", "p2", "p1");
        m.status = MatchStatus::Pending;
        assert_eq!(m.loser(), None);
    }

    #[test]
    fn test_loser_with_missing_slot() {
        let mut m = decided_match("m1", "p1", "p2", "p1");
        m.player2 = None;
        assert_eq!(m.loser(), None);
    }

    #[test]
    fn test_final_and_third_place_lookup() {
        let mut third = decided_match("m3", "p3", "p4", "p3");
        third.is_third_place_match = true;
        let bracket = PlayoffBracket {
            rounds: vec![
                BracketRound {
                    name: Some("Semifinals".to_string()),
                    matches: vec![decided_match("m1", "p1", "p3", "p1")],
                },
                BracketRound {
                    name: Some("Final".to_string()),
                    matches: vec![decided_match("m2", "p1", "p2", "p1"), third],
                },
            ],
        };

        assert_eq!(bracket.final_match().unwrap().id.as_str(), "m2");
        assert_eq!(bracket.third_place_match().unwrap().id.as_str(), "m3");
    }

    #[test]
    fn test_empty_bracket_lookups() {
        let bracket = PlayoffBracket::default();
        assert!(bracket.final_round().is_none());
        assert!(bracket.final_match().is_none());
        assert!(bracket.third_place_match().is_none());
    }

    #[test]
    fn test_match_status_serialization() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&MatchStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
