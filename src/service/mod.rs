//! Orchestration services over the store.
//!
//! Single-unit operations raise immediately; batch operations (full
//! recalculation, player merge) catch per-unit failures, log them, and return
//! aggregate reports so callers can render exactly what needs attention.

mod leaderboard;
mod linkage;
mod membership;
mod merge;
mod recorder;

#[cfg(test)]
pub(crate) mod test_support;

pub use leaderboard::LeaderboardService;
pub use linkage::LinkageService;
pub use membership::{MemberSpec, MembershipService};
pub use merge::PlayerMergeService;
pub use recorder::PlacementRecorder;

use serde::Serialize;
use thiserror::Error;

use crate::models::{LeagueId, PlayerId, TournamentId};
use crate::storage::StorageError;

/// Errors that can occur during service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("tournament {tournament_id} is already linked to league {league_id}")]
    AlreadyLinked {
        tournament_id: TournamentId,
        league_id: LeagueId,
    },

    #[error("cannot merge a player into itself: {0}")]
    SelfMerge(PlayerId),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Outcome of recording one tournament's placements. An already-calculated
/// tournament is a no-op success, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RecordOutcome {
    Recorded { rows: usize },
    AlreadyCalculated,
}

/// One tournament that failed during a full recalculation.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentFailure {
    pub tournament_id: TournamentId,
    pub error: String,
}

/// Aggregate report for a league-wide recalculation. A failing tournament
/// never aborts the batch; it lands here instead.
#[derive(Debug, Clone, Serialize)]
pub struct RecalculationReport {
    pub league_id: LeagueId,
    /// Completed tournaments considered.
    pub attempted: usize,
    pub recorded: usize,
    pub skipped: usize,
    pub failures: Vec<TournamentFailure>,
}

impl RecalculationReport {
    pub fn new(league_id: LeagueId) -> Self {
        Self {
            league_id,
            attempted: 0,
            recorded: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }
}

/// Outcome of migrating one reference table during a player merge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum MigrationOutcome {
    Migrated { rows: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TableMigration {
    pub table: String,
    #[serde(flatten)]
    pub outcome: MigrationOutcome,
}

impl TableMigration {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, MigrationOutcome::Migrated { .. })
    }
}

/// Aggregate report for a player merge. The source player row is deleted
/// only when every table migrated; otherwise the failure list makes the
/// merge diagnosable and safely retryable.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub source_id: PlayerId,
    pub target_id: PlayerId,
    /// The source row was already gone: a completed earlier merge.
    pub already_merged: bool,
    pub tables: Vec<TableMigration>,
    pub source_deleted: bool,
}

impl MergeReport {
    pub fn already_merged(source_id: PlayerId, target_id: PlayerId) -> Self {
        Self {
            source_id,
            target_id,
            already_merged: true,
            tables: Vec::new(),
            source_deleted: true,
        }
    }

    /// Whether every table migrated and the source row is gone.
    pub fn complete(&self) -> bool {
        self.source_deleted && self.tables.iter().all(TableMigration::succeeded)
    }
}
