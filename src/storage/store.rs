//! The abstract store the engine runs against.
//!
//! Services depend on `dyn LeagueStore`, never on the JSONL files directly.
//! The trait is synchronous: the shipped backend is the local filesystem and
//! handlers call it inline, the same way the JSONL readers are used
//! throughout the surrounding codebase.

use serde_json::Value;

use super::{StorageError, Table};
use crate::models::{
    LeaderboardEntry, League, LeagueId, LeagueMember, MemberRole, Player, PlayerId, ResultRow,
    ScoredResult, ScoringRules, Tournament, TournamentData, TournamentId,
};

/// Partial update for a league membership row.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub role: Option<MemberRole>,
    pub is_active: Option<bool>,
    /// `Some(true)` stamps `left_at` now, `Some(false)` clears it.
    pub mark_left: Option<bool>,
}

/// Store operations the engine needs. Implementable over any relational or
/// document store; this repo ships the JSONL data-lake implementation.
///
/// The generic reference operations at the bottom power the player merge.
/// Columns there are dot-separated paths into the row JSON (`"player_id"`,
/// `"result.winner"`), so nested references migrate the same way flat ones
/// do.
pub trait LeagueStore: Send + Sync {
    // ── Leagues ──────────────────────────────────────────────────────────

    fn read_league(&self, id: &LeagueId) -> Result<Option<League>, StorageError>;

    fn insert_league(&self, league: &League) -> Result<(), StorageError>;

    fn read_scoring_rules(&self, id: &LeagueId) -> Result<Option<ScoringRules>, StorageError>;

    // ── Tournaments ──────────────────────────────────────────────────────

    /// Read a tournament together with the live match rows for its bracket.
    /// Two unsynchronized reads; the freshness overlay tolerates the skew.
    fn read_tournament(&self, id: &TournamentId) -> Result<Option<TournamentData>, StorageError>;

    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), StorageError>;

    fn list_league_tournaments(&self, league_id: &LeagueId) -> Result<Vec<Tournament>, StorageError>;

    fn list_unlinked_tournaments(&self) -> Result<Vec<Tournament>, StorageError>;

    /// Assign or clear a tournament's league. Always clears the
    /// points-calculated flag so recompute paths pick the tournament up.
    fn set_tournament_league(
        &self,
        id: &TournamentId,
        league_id: Option<&LeagueId>,
    ) -> Result<bool, StorageError>;

    fn mark_tournament_calculated(&self, id: &TournamentId, flag: bool)
        -> Result<bool, StorageError>;

    // ── Result rows ──────────────────────────────────────────────────────

    /// Upsert keyed by (league, tournament, player); rerunning with the same
    /// input leaves the table unchanged.
    fn upsert_result_rows(&self, rows: &[ResultRow]) -> Result<(), StorageError>;

    fn delete_result_rows(
        &self,
        league_id: &LeagueId,
        tournament_id: &TournamentId,
    ) -> Result<usize, StorageError>;

    /// All result rows for a league, joined with each tournament's creation
    /// timestamp.
    fn read_result_rows(&self, league_id: &LeagueId) -> Result<Vec<ScoredResult>, StorageError>;

    // ── Leaderboard cache ────────────────────────────────────────────────

    /// Upsert keyed by (league, player), replacing prior cached values.
    fn upsert_leaderboard_rows(&self, rows: &[LeaderboardEntry]) -> Result<(), StorageError>;

    fn read_leaderboard(&self, league_id: &LeagueId) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// Patch only `total_points` on one cached row. Returns false when no
    /// row exists for the player.
    fn patch_leaderboard_points(
        &self,
        league_id: &LeagueId,
        player_id: &PlayerId,
        total_points: i64,
    ) -> Result<bool, StorageError>;

    // ── Players & membership ─────────────────────────────────────────────

    fn read_player(&self, id: &PlayerId) -> Result<Option<Player>, StorageError>;

    fn insert_player(&self, player: &Player) -> Result<(), StorageError>;

    fn delete_player(&self, id: &PlayerId) -> Result<bool, StorageError>;

    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>, StorageError>;

    /// Case-insensitive substring search, ordered by name.
    fn search_players(&self, term: &str) -> Result<Vec<Player>, StorageError>;

    fn list_players(&self) -> Result<Vec<Player>, StorageError>;

    /// Upsert keyed by (league, player).
    fn upsert_members(&self, members: &[LeagueMember]) -> Result<(), StorageError>;

    fn list_members(&self, league_id: &LeagueId) -> Result<Vec<LeagueMember>, StorageError>;

    fn update_member(
        &self,
        league_id: &LeagueId,
        player_id: &PlayerId,
        patch: MemberPatch,
    ) -> Result<bool, StorageError>;

    // ── Generic reference operations (player merge) ──────────────────────

    /// Rows of `table` whose `column` equals the given player ID.
    fn list_referencing_rows(
        &self,
        table: Table,
        column: &str,
        player_id: &PlayerId,
    ) -> Result<Vec<Value>, StorageError>;

    /// Whether any row matches all (column, value) pairs.
    fn reference_row_exists(
        &self,
        table: Table,
        filter: &[(&str, &Value)],
    ) -> Result<bool, StorageError>;

    /// Set `column` to `to` on every row where it currently equals `from`.
    /// Returns the number of rows updated.
    fn update_column_where(
        &self,
        table: Table,
        column: &str,
        from: &PlayerId,
        to: &PlayerId,
    ) -> Result<usize, StorageError>;

    /// Set `column` on the row whose `id` field matches `row_id`.
    fn update_row_column(
        &self,
        table: Table,
        row_id: &str,
        column: &str,
        value: &Value,
    ) -> Result<bool, StorageError>;

    /// Delete the row whose `id` field matches `row_id`.
    fn delete_row(&self, table: Table, row_id: &str) -> Result<bool, StorageError>;

    /// Delete every row matching all (column, value) pairs. Returns the
    /// number of rows removed.
    fn delete_rows_where(
        &self,
        table: Table,
        filter: &[(&str, &Value)],
    ) -> Result<usize, StorageError>;

    fn insert_row(&self, table: Table, row: &Value) -> Result<(), StorageError>;
}

/// Look up a dot-separated path in a JSON object.
pub fn value_at_path<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = row;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Set a dot-separated path in a JSON object. Returns false (and leaves the
/// row untouched) when any intermediate segment is missing or not an object.
pub fn set_value_at_path(row: &mut Value, path: &str, value: Value) -> bool {
    let mut current = row;
    let segments: Vec<&str> = path.split('.').collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return false,
    };
    for segment in parents {
        current = match current.get_mut(*segment) {
            Some(next) => next,
            None => return false,
        };
    }
    match current.as_object_mut() {
        Some(object) if object.contains_key(*last) => {
            object.insert((*last).to_string(), value);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_at_flat_path() {
        let row = json!({"player_id": "p1"});
        assert_eq!(value_at_path(&row, "player_id"), Some(&json!("p1")));
        assert_eq!(value_at_path(&row, "missing"), None);
    }

    #[test]
    fn test_value_at_nested_path() {
        let row = json!({"result": {"winner": "p2"}});
        assert_eq!(value_at_path(&row, "result.winner"), Some(&json!("p2")));
        assert_eq!(value_at_path(&row, "result.loser"), None);
        assert_eq!(value_at_path(&row, "player1.id"), None);
    }

    #[test]
    fn test_set_value_at_path() {
        let mut row = json!({"result": {"winner": "p1"}});
        assert!(set_value_at_path(&mut row, "result.winner", json!("p2")));
        assert_eq!(row, json!({"result": {"winner": "p2"}}));
    }

    #[test]
    fn test_set_value_missing_parent_is_noop() {
        let mut row = json!({"player_id": "p1"});
        assert!(!set_value_at_path(&mut row, "result.winner", json!("p2")));
        assert_eq!(row, json!({"player_id": "p1"}));
    }

    #[test]
    fn test_set_value_missing_leaf_is_noop() {
        // Only existing columns are updated; merge must not invent fields.
        let mut row = json!({"result": {"winner": "p1"}});
        assert!(!set_value_at_path(&mut row, "result.loser", json!("p2")));
    }
}
