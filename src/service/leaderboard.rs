//! Leaderboard aggregation and recalculation.

use std::sync::Arc;

use tracing::{error, info};

use crate::calculate::aggregate_leaderboard;
use crate::models::{LeaderboardEntry, LeagueId, PlayerId};
use crate::storage::LeagueStore;

use super::{
    PlacementRecorder, RecalculationReport, RecordOutcome, ServiceError, TournamentFailure,
};

pub struct LeaderboardService {
    store: Arc<dyn LeagueStore>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Recompute the cached leaderboard from all of the league's result
    /// rows. Full overwrite per player, so repeated calls self-correct any
    /// drift, except rows for players with no remaining results, which stay
    /// cached as-is rather than being pruned.
    pub fn update_cache(
        &self,
        league_id: &LeagueId,
    ) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let results = self.store.read_result_rows(league_id)?;
        let entries = aggregate_leaderboard(league_id, &results);
        self.store.upsert_leaderboard_rows(&entries)?;
        info!(
            league = %league_id,
            entries = entries.len(),
            "leaderboard cache updated"
        );
        Ok(entries)
    }

    /// Recompute placements for every completed tournament in the league
    /// (skipping already-calculated ones unless `force`), then aggregate
    /// once. A failing tournament is logged and reported, never fatal to the
    /// batch.
    pub fn full_update(
        &self,
        league_id: &LeagueId,
        force: bool,
    ) -> Result<RecalculationReport, ServiceError> {
        self.store
            .read_league(league_id)?
            .ok_or_else(|| ServiceError::not_found("league", league_id))?;

        let tournaments = self.store.list_league_tournaments(league_id)?;
        let recorder = PlacementRecorder::new(self.store.clone());
        let mut report = RecalculationReport::new(league_id.clone());

        for tournament in tournaments.iter().filter(|t| t.is_completed()) {
            report.attempted += 1;
            match recorder.record(league_id, &tournament.id, force) {
                Ok(RecordOutcome::Recorded { rows }) => {
                    info!(
                        tournament = %tournament.id,
                        rows,
                        "recalculated tournament results"
                    );
                    report.recorded += 1;
                }
                Ok(RecordOutcome::AlreadyCalculated) => {
                    report.skipped += 1;
                }
                Err(e) => {
                    error!(
                        tournament = %tournament.id,
                        error = %e,
                        "failed to recalculate tournament, continuing"
                    );
                    report.failures.push(TournamentFailure {
                        tournament_id: tournament.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.update_cache(league_id)?;
        info!(
            league = %league_id,
            attempted = report.attempted,
            recorded = report.recorded,
            skipped = report.skipped,
            failed = report.failures.len(),
            "full leaderboard update finished"
        );
        Ok(report)
    }

    /// Manual override: overwrite the cached `total_points` for one player.
    ///
    /// This is a cache patch, nothing more: placement stats and result rows
    /// are untouched, and the next full aggregation discards the patched
    /// value. It exists so admins can correct totals that have no matching
    /// tournament result (legacy imports and the like).
    pub fn set_points(
        &self,
        league_id: &LeagueId,
        player_id: &PlayerId,
        total_points: i64,
    ) -> Result<(), ServiceError> {
        let patched = self
            .store
            .patch_leaderboard_points(league_id, player_id, total_points)?;
        if !patched {
            return Err(ServiceError::not_found("leaderboard entry", player_id));
        }
        info!(
            league = %league_id,
            player = %player_id,
            total_points,
            "manually overrode leaderboard points"
        );
        Ok(())
    }
}
