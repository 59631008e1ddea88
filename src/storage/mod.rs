//! Filesystem data lake operations.
//!
//! All persistent state lives in per-table JSONL files under the data
//! directory. The `LeagueStore` trait abstracts the operations the engine
//! needs so another backend (SQL, document store) could slot in; the JSONL
//! implementation is the one this repo ships.

mod jsonl;
mod jsonl_store;
mod store;

pub use jsonl::{JsonlReader, JsonlWriter};
pub use jsonl_store::JsonlStore;
pub use store::{LeagueStore, MemberPatch, value_at_path, set_value_at_path};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// The tables of the data lake. Tables the engine never writes through a
/// typed model (legs, dart throws, per-match stats) still appear here so the
/// player merge can migrate their references generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Players,
    Leagues,
    LeagueMembers,
    Tournaments,
    TournamentPlayers,
    GroupPlayers,
    Matches,
    Legs,
    DartThrows,
    MatchPlayerStats,
    GroupStandings,
    TournamentStats,
    LeagueTournamentResults,
    LeagueLeaderboard,
}

impl Table {
    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            Table::Players => "players.jsonl",
            Table::Leagues => "leagues.jsonl",
            Table::LeagueMembers => "league_members.jsonl",
            Table::Tournaments => "tournaments.jsonl",
            Table::TournamentPlayers => "tournament_players.jsonl",
            Table::GroupPlayers => "group_players.jsonl",
            Table::Matches => "matches.jsonl",
            Table::Legs => "legs.jsonl",
            Table::DartThrows => "dart_throws.jsonl",
            Table::MatchPlayerStats => "match_player_stats.jsonl",
            Table::GroupStandings => "group_standings.jsonl",
            Table::TournamentStats => "tournament_stats.jsonl",
            Table::LeagueTournamentResults => "league_tournament_results.jsonl",
            Table::LeagueLeaderboard => "league_leaderboard.jsonl",
        }
    }

    /// The table name as the surrounding system knows it, for logs and
    /// merge reports.
    pub fn name(&self) -> &'static str {
        let filename = self.filename();
        &filename[..filename.len() - ".jsonl".len()]
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.data_dir.join("tables")
    }

    pub fn table_path(&self, table: Table) -> PathBuf {
        self.tables_dir().join(table.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
