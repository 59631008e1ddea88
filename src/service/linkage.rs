//! League ↔ tournament linkage.

use std::sync::Arc;

use tracing::info;

use crate::models::{LeagueId, Tournament, TournamentId};
use crate::storage::LeagueStore;

use super::{LeaderboardService, PlacementRecorder, ServiceError};

pub struct LinkageService {
    store: Arc<dyn LeagueStore>,
}

impl LinkageService {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Attach a tournament to a league.
    ///
    /// Refused when the tournament already has a league assignment (even the
    /// same one; unlink first), with no partial mutation. The calculated
    /// flag is reset, and a tournament that is already completed is scored
    /// and aggregated immediately so the leaderboard reflects it without a
    /// separate recalculation trigger.
    pub fn link(
        &self,
        league_id: &LeagueId,
        tournament_id: &TournamentId,
    ) -> Result<(), ServiceError> {
        self.store
            .read_league(league_id)?
            .ok_or_else(|| ServiceError::not_found("league", league_id))?;
        let data = self
            .store
            .read_tournament(tournament_id)?
            .ok_or_else(|| ServiceError::not_found("tournament", tournament_id))?;

        if let Some(existing) = data.tournament.league_id {
            return Err(ServiceError::AlreadyLinked {
                tournament_id: tournament_id.clone(),
                league_id: existing,
            });
        }

        self.store
            .set_tournament_league(tournament_id, Some(league_id))?;
        info!(tournament = %tournament_id, league = %league_id, "linked tournament");

        if data.tournament.is_completed() {
            PlacementRecorder::new(self.store.clone()).record(league_id, tournament_id, false)?;
            LeaderboardService::new(self.store.clone()).update_cache(league_id)?;
        }

        Ok(())
    }

    /// Detach a tournament from its league, delete its result rows for that
    /// league, and re-aggregate so the cached totals drop its contribution
    /// immediately.
    pub fn unlink(
        &self,
        league_id: &LeagueId,
        tournament_id: &TournamentId,
    ) -> Result<(), ServiceError> {
        let data = self
            .store
            .read_tournament(tournament_id)?
            .ok_or_else(|| ServiceError::not_found("tournament", tournament_id))?;
        if data.tournament.league_id.as_ref() != Some(league_id) {
            return Err(ServiceError::not_found(
                "tournament in league",
                tournament_id,
            ));
        }

        self.store.set_tournament_league(tournament_id, None)?;
        let removed = self
            .store
            .delete_result_rows(league_id, tournament_id)?;
        info!(
            tournament = %tournament_id,
            league = %league_id,
            removed,
            "unlinked tournament"
        );
        LeaderboardService::new(self.store.clone()).update_cache(league_id)?;
        Ok(())
    }

    /// Tournaments with no league assignment, for the "add existing
    /// tournament" picker.
    pub fn list_unlinked(&self) -> Result<Vec<Tournament>, ServiceError> {
        Ok(self.store.list_unlinked_tournaments()?)
    }
}
