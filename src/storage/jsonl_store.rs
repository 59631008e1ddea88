//! JSONL data-lake implementation of [`LeagueStore`].
//!
//! Keyed upserts are read-modify-rewrite over the whole table file. Fine for
//! the data volumes of a darts league; a SQL backend would push the same
//! operations down as statements.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use super::jsonl::{JsonlReader, JsonlWriter};
use super::store::{set_value_at_path, value_at_path, LeagueStore, MemberPatch};
use super::{StorageConfig, StorageError, Table};
use crate::models::{
    LeaderboardEntry, League, LeagueId, LeagueMember, MatchRecord, Player, PlayerId, ResultRow,
    ScoredResult, ScoringRules, Tournament, TournamentData, TournamentId,
};

/// Store over per-table JSONL files.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    config: StorageConfig,
}

impl JsonlStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn from_dir(data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(StorageConfig::new(data_dir.into()))
    }

    fn read_table<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, StorageError> {
        JsonlReader::for_table(&self.config, table).read_all()
    }

    fn write_table<T: Serialize>(&self, table: Table, rows: &[T]) -> Result<(), StorageError> {
        JsonlWriter::for_table(&self.config, table).write_all(rows)?;
        Ok(())
    }

    fn append_row<T: Serialize>(&self, table: Table, row: &T) -> Result<(), StorageError> {
        JsonlWriter::for_table(&self.config, table).append(row)
    }
}

impl LeagueStore for JsonlStore {
    fn read_league(&self, id: &LeagueId) -> Result<Option<League>, StorageError> {
        let leagues: Vec<League> = self.read_table(Table::Leagues)?;
        Ok(leagues.into_iter().find(|l| &l.id == id))
    }

    fn insert_league(&self, league: &League) -> Result<(), StorageError> {
        self.append_row(Table::Leagues, league)
    }

    fn read_scoring_rules(&self, id: &LeagueId) -> Result<Option<ScoringRules>, StorageError> {
        Ok(self.read_league(id)?.map(|l| l.scoring_rules))
    }

    fn read_tournament(&self, id: &TournamentId) -> Result<Option<TournamentData>, StorageError> {
        let tournaments: Vec<Tournament> = self.read_table(Table::Tournaments)?;
        let tournament = match tournaments.into_iter().find(|t| &t.id == id) {
            Some(t) => t,
            None => return Ok(None),
        };
        // Second, unsynchronized read; the freshness overlay absorbs skew.
        let live_matches: Vec<MatchRecord> = JsonlReader::for_table(&self.config, Table::Matches)
            .read_filtered(|m: &MatchRecord| &m.tournament_id == id)?;
        Ok(Some(TournamentData {
            tournament,
            live_matches,
        }))
    }

    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), StorageError> {
        self.append_row(Table::Tournaments, tournament)
    }

    fn list_league_tournaments(
        &self,
        league_id: &LeagueId,
    ) -> Result<Vec<Tournament>, StorageError> {
        let tournaments: Vec<Tournament> = self.read_table(Table::Tournaments)?;
        Ok(tournaments
            .into_iter()
            .filter(|t| t.league_id.as_ref() == Some(league_id))
            .collect())
    }

    fn list_unlinked_tournaments(&self) -> Result<Vec<Tournament>, StorageError> {
        let tournaments: Vec<Tournament> = self.read_table(Table::Tournaments)?;
        Ok(tournaments
            .into_iter()
            .filter(|t| t.league_id.is_none())
            .collect())
    }

    fn set_tournament_league(
        &self,
        id: &TournamentId,
        league_id: Option<&LeagueId>,
    ) -> Result<bool, StorageError> {
        let mut tournaments: Vec<Tournament> = self.read_table(Table::Tournaments)?;
        let mut found = false;
        for t in tournaments.iter_mut() {
            if &t.id == id {
                t.league_id = league_id.cloned();
                t.league_points_calculated = false;
                t.updated_at = Utc::now();
                found = true;
            }
        }
        if found {
            self.write_table(Table::Tournaments, &tournaments)?;
        }
        Ok(found)
    }

    fn mark_tournament_calculated(
        &self,
        id: &TournamentId,
        flag: bool,
    ) -> Result<bool, StorageError> {
        let mut tournaments: Vec<Tournament> = self.read_table(Table::Tournaments)?;
        let mut found = false;
        for t in tournaments.iter_mut() {
            if &t.id == id {
                t.league_points_calculated = flag;
                t.updated_at = Utc::now();
                found = true;
            }
        }
        if found {
            self.write_table(Table::Tournaments, &tournaments)?;
        }
        Ok(found)
    }

    fn upsert_result_rows(&self, rows: &[ResultRow]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut existing: Vec<ResultRow> = self.read_table(Table::LeagueTournamentResults)?;
        for row in rows {
            match existing.iter_mut().find(|r| r.id == row.id) {
                Some(slot) => *slot = row.clone(),
                None => existing.push(row.clone()),
            }
        }
        debug!(count = rows.len(), "upserted result rows");
        self.write_table(Table::LeagueTournamentResults, &existing)
    }

    fn delete_result_rows(
        &self,
        league_id: &LeagueId,
        tournament_id: &TournamentId,
    ) -> Result<usize, StorageError> {
        let existing: Vec<ResultRow> = self.read_table(Table::LeagueTournamentResults)?;
        let before = existing.len();
        let kept: Vec<ResultRow> = existing
            .into_iter()
            .filter(|r| !(&r.league_id == league_id && &r.tournament_id == tournament_id))
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.write_table(Table::LeagueTournamentResults, &kept)?;
        }
        Ok(removed)
    }

    fn read_result_rows(&self, league_id: &LeagueId) -> Result<Vec<ScoredResult>, StorageError> {
        let rows: Vec<ResultRow> = self.read_table(Table::LeagueTournamentResults)?;
        let tournaments: Vec<Tournament> = self.read_table(Table::Tournaments)?;
        let timestamps: std::collections::HashMap<_, _> = tournaments
            .into_iter()
            .map(|t| (t.id, t.created_at))
            .collect();

        Ok(rows
            .into_iter()
            .filter(|r| &r.league_id == league_id)
            .map(|row| {
                let tournament_at = timestamps.get(&row.tournament_id).copied();
                ScoredResult { row, tournament_at }
            })
            .collect())
    }

    fn upsert_leaderboard_rows(&self, rows: &[LeaderboardEntry]) -> Result<(), StorageError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut existing: Vec<LeaderboardEntry> = self.read_table(Table::LeagueLeaderboard)?;
        for row in rows {
            let slot = existing
                .iter_mut()
                .find(|e| e.league_id == row.league_id && e.player_id == row.player_id);
            match slot {
                Some(slot) => *slot = row.clone(),
                None => existing.push(row.clone()),
            }
        }
        self.write_table(Table::LeagueLeaderboard, &existing)
    }

    fn read_leaderboard(&self, league_id: &LeagueId) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let mut entries: Vec<LeaderboardEntry> = self
            .read_table::<LeaderboardEntry>(Table::LeagueLeaderboard)?
            .into_iter()
            .filter(|e| &e.league_id == league_id)
            .collect();
        entries.sort_by(|a, b| {
            b.total_points.cmp(&a.total_points).then_with(|| {
                a.avg_placement
                    .partial_cmp(&b.avg_placement)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        Ok(entries)
    }

    fn patch_leaderboard_points(
        &self,
        league_id: &LeagueId,
        player_id: &PlayerId,
        total_points: i64,
    ) -> Result<bool, StorageError> {
        let mut entries: Vec<LeaderboardEntry> = self.read_table(Table::LeagueLeaderboard)?;
        let mut found = false;
        for entry in entries.iter_mut() {
            if &entry.league_id == league_id && &entry.player_id == player_id {
                entry.total_points = total_points;
                entry.updated_at = Utc::now();
                found = true;
            }
        }
        if found {
            self.write_table(Table::LeagueLeaderboard, &entries)?;
        }
        Ok(found)
    }

    fn read_player(&self, id: &PlayerId) -> Result<Option<Player>, StorageError> {
        let players: Vec<Player> = self.read_table(Table::Players)?;
        Ok(players.into_iter().find(|p| &p.id == id))
    }

    fn insert_player(&self, player: &Player) -> Result<(), StorageError> {
        self.append_row(Table::Players, player)
    }

    fn delete_player(&self, id: &PlayerId) -> Result<bool, StorageError> {
        let players: Vec<Player> = self.read_table(Table::Players)?;
        let before = players.len();
        let kept: Vec<Player> = players.into_iter().filter(|p| &p.id != id).collect();
        let removed = before != kept.len();
        if removed {
            self.write_table(Table::Players, &kept)?;
        }
        Ok(removed)
    }

    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>, StorageError> {
        let players: Vec<Player> = self.read_table(Table::Players)?;
        Ok(players.into_iter().find(|p| p.name == name))
    }

    fn search_players(&self, term: &str) -> Result<Vec<Player>, StorageError> {
        let needle = term.to_lowercase();
        let mut players: Vec<Player> = self
            .read_table::<Player>(Table::Players)?
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(players)
    }

    fn list_players(&self) -> Result<Vec<Player>, StorageError> {
        let mut players: Vec<Player> = self.read_table(Table::Players)?;
        players.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(players)
    }

    fn upsert_members(&self, members: &[LeagueMember]) -> Result<(), StorageError> {
        if members.is_empty() {
            return Ok(());
        }
        let mut existing: Vec<LeagueMember> = self.read_table(Table::LeagueMembers)?;
        for member in members {
            let slot = existing
                .iter_mut()
                .find(|m| m.league_id == member.league_id && m.player_id == member.player_id);
            match slot {
                Some(slot) => *slot = member.clone(),
                None => existing.push(member.clone()),
            }
        }
        self.write_table(Table::LeagueMembers, &existing)
    }

    fn list_members(&self, league_id: &LeagueId) -> Result<Vec<LeagueMember>, StorageError> {
        let mut members: Vec<LeagueMember> = self
            .read_table::<LeagueMember>(Table::LeagueMembers)?
            .into_iter()
            .filter(|m| &m.league_id == league_id && m.left_at.is_none())
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    fn update_member(
        &self,
        league_id: &LeagueId,
        player_id: &PlayerId,
        patch: MemberPatch,
    ) -> Result<bool, StorageError> {
        let mut members: Vec<LeagueMember> = self.read_table(Table::LeagueMembers)?;
        let mut found = false;
        for member in members.iter_mut() {
            if &member.league_id == league_id && &member.player_id == player_id {
                if let Some(role) = patch.role {
                    member.role = role;
                }
                if let Some(active) = patch.is_active {
                    member.is_active = active;
                }
                match patch.mark_left {
                    Some(true) => member.left_at = Some(Utc::now()),
                    Some(false) => member.left_at = None,
                    None => {}
                }
                found = true;
            }
        }
        if found {
            self.write_table(Table::LeagueMembers, &members)?;
        }
        Ok(found)
    }

    fn list_referencing_rows(
        &self,
        table: Table,
        column: &str,
        player_id: &PlayerId,
    ) -> Result<Vec<Value>, StorageError> {
        let rows: Vec<Value> = self.read_table(table)?;
        Ok(rows
            .into_iter()
            .filter(|row| {
                value_at_path(row, column).and_then(Value::as_str) == Some(player_id.as_str())
            })
            .collect())
    }

    fn reference_row_exists(
        &self,
        table: Table,
        filter: &[(&str, &Value)],
    ) -> Result<bool, StorageError> {
        let rows: Vec<Value> = self.read_table(table)?;
        Ok(rows.iter().any(|row| {
            filter
                .iter()
                .all(|(column, expected)| value_at_path(row, column) == Some(*expected))
        }))
    }

    fn update_column_where(
        &self,
        table: Table,
        column: &str,
        from: &PlayerId,
        to: &PlayerId,
    ) -> Result<usize, StorageError> {
        let mut rows: Vec<Value> = self.read_table(table)?;
        let mut updated = 0;
        for row in rows.iter_mut() {
            let matches =
                value_at_path(row, column).and_then(Value::as_str) == Some(from.as_str());
            if matches && set_value_at_path(row, column, Value::String(to.as_str().to_string())) {
                updated += 1;
            }
        }
        if updated > 0 {
            self.write_table(table, &rows)?;
        }
        Ok(updated)
    }

    fn update_row_column(
        &self,
        table: Table,
        row_id: &str,
        column: &str,
        value: &Value,
    ) -> Result<bool, StorageError> {
        let mut rows: Vec<Value> = self.read_table(table)?;
        let mut found = false;
        for row in rows.iter_mut() {
            if row.get("id").and_then(Value::as_str) == Some(row_id) {
                found = set_value_at_path(row, column, value.clone());
            }
        }
        if found {
            self.write_table(table, &rows)?;
        }
        Ok(found)
    }

    fn delete_row(&self, table: Table, row_id: &str) -> Result<bool, StorageError> {
        let rows: Vec<Value> = self.read_table(table)?;
        let before = rows.len();
        let kept: Vec<Value> = rows
            .into_iter()
            .filter(|row| row.get("id").and_then(Value::as_str) != Some(row_id))
            .collect();
        let removed = kept.len() != before;
        if removed {
            self.write_table(table, &kept)?;
        }
        Ok(removed)
    }

    fn delete_rows_where(
        &self,
        table: Table,
        filter: &[(&str, &Value)],
    ) -> Result<usize, StorageError> {
        let rows: Vec<Value> = self.read_table(table)?;
        let before = rows.len();
        let kept: Vec<Value> = rows
            .into_iter()
            .filter(|row| {
                !filter
                    .iter()
                    .all(|(column, expected)| value_at_path(row, column) == Some(*expected))
            })
            .collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.write_table(table, &kept)?;
        }
        Ok(removed)
    }

    fn insert_row(&self, table: Table, row: &Value) -> Result<(), StorageError> {
        self.append_row(table, row)
    }
}
