//! Placement recorder.
//!
//! Turns a completed tournament into persisted result rows: extract
//! placements, resolve each against the league's scoring rules, upsert one
//! row per (league, tournament, player). Deterministic row identity makes
//! the whole operation idempotent; recalculation is a supported user
//! action, not a special case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::calculate::{extract_placements, resolve_points};
use crate::models::{LeagueId, ResultRow, TournamentId};
use crate::storage::LeagueStore;

use super::{RecordOutcome, ServiceError};

pub struct PlacementRecorder {
    store: Arc<dyn LeagueStore>,
}

impl PlacementRecorder {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Record league points for one tournament.
    ///
    /// A tournament whose points are already calculated is a no-op success
    /// unless `force` is set. The calculated flag is only written after a
    /// successful row upsert; a tournament that yields no placements (e.g.
    /// bracket not played out) stays unflagged so a later recompute picks it
    /// up.
    pub fn record(
        &self,
        league_id: &LeagueId,
        tournament_id: &TournamentId,
        force: bool,
    ) -> Result<RecordOutcome, ServiceError> {
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

        if data.tournament.league_points_calculated && !force {
            debug!(
                tournament = %tournament_id,
                "league points already calculated, skipping"
            );
            return Ok(RecordOutcome::AlreadyCalculated);
        }

        let rules = self
            .store
            .read_scoring_rules(league_id)?
            .ok_or_else(|| ServiceError::not_found("league", league_id))?;

        let placements = extract_placements(&data.tournament, &data.live_matches);
        if placements.is_empty() {
            warn!(
                tournament = %tournament_id,
                "no placements extracted, nothing to record"
            );
            return Ok(RecordOutcome::Recorded { rows: 0 });
        }

        let rows: Vec<ResultRow> = placements
            .iter()
            .map(|p| {
                ResultRow::new(
                    league_id.clone(),
                    tournament_id.clone(),
                    p.player_id.clone(),
                    p.placement,
                    resolve_points(&rules.placement_points, p),
                )
            })
            .collect();

        self.store.upsert_result_rows(&rows)?;
        self.store.mark_tournament_calculated(tournament_id, true)?;
        info!(
            tournament = %tournament_id,
            league = %league_id,
            rows = rows.len(),
            "recorded tournament results"
        );

        Ok(RecordOutcome::Recorded { rows: rows.len() })
    }
}
