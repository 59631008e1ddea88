//! League, membership, result row and leaderboard models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, LeagueId, PlayerId, ResultRowId, ScoringRules, TournamentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeagueStatus {
    #[default]
    Active,
    Archived,
}

/// A league. Scoring rules are configured per league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: LeagueStatus,
    #[serde(default)]
    pub scoring_rules: ScoringRules,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl League {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::random(),
            name: name.into(),
            description: None,
            status: LeagueStatus::Active,
            scoring_rules: ScoringRules::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[default]
    Player,
    Captain,
}

/// League membership row, unique per (league, player).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueMember {
    pub id: EntityId,
    pub league_id: LeagueId,
    pub player_id: PlayerId,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl LeagueMember {
    pub fn new(league_id: LeagueId, player_id: PlayerId) -> Self {
        let id = EntityId::generate(&[league_id.as_str(), player_id.as_str(), "member"]);
        Self {
            id,
            league_id,
            player_id,
            role: MemberRole::Player,
            is_active: true,
            joined_at: Utc::now(),
            left_at: None,
        }
    }
}

/// One persisted (league, tournament, player) placement + points record, the
/// unit the leaderboard aggregator reads. The ID is derived from the three
/// keys, so recomputation upserts in place instead of duplicating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: ResultRowId,
    pub league_id: LeagueId,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub placement: u32,
    pub points_awarded: i64,
}

impl ResultRow {
    pub fn new(
        league_id: LeagueId,
        tournament_id: TournamentId,
        player_id: PlayerId,
        placement: u32,
        points_awarded: i64,
    ) -> Self {
        let id = EntityId::generate(&[
            league_id.as_str(),
            tournament_id.as_str(),
            player_id.as_str(),
        ]);
        Self {
            id,
            league_id,
            tournament_id,
            player_id,
            placement,
            points_awarded,
        }
    }
}

/// A result row joined with its tournament's timestamp, the shape the
/// aggregator consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub row: ResultRow,
    pub tournament_at: Option<DateTime<Utc>>,
}

/// Cached per-league, per-player cumulative standing. Fully derived from
/// result rows, except where a manual override has patched `total_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub league_id: LeagueId,
    pub player_id: PlayerId,
    pub total_points: i64,
    pub tournaments_played: u32,
    pub best_placement: Option<u32>,
    pub worst_placement: Option<u32>,
    pub avg_placement: Option<f64>,
    pub last_tournament_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_row_id_deterministic() {
        let a = ResultRow::new("l1".into(), "t1".into(), "p1".into(), 1, 5);
        let b = ResultRow::new("l1".into(), "t1".into(), "p1".into(), 3, 3);
        // Same keys, same identity: recomputation overwrites in place.
        assert_eq!(a.id, b.id);

        let c = ResultRow::new("l1".into(), "t1".into(), "p2".into(), 1, 5);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_member_id_deterministic() {
        let a = LeagueMember::new("l1".into(), "p1".into());
        let b = LeagueMember::new("l1".into(), "p1".into());
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_scored_result_flattens_row() {
        let scored = ScoredResult {
            row: ResultRow::new("l1".into(), "t1".into(), "p1".into(), 2, 4),
            tournament_at: None,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["placement"], 2);
        assert_eq!(json["points_awarded"], 4);
    }
}
