//! Freshness overlay for bracket matches.
//!
//! The bracket snapshot embedded in the tournament record can be stale for
//! `status`/`result` (e.g. a third-place match finished after the snapshot
//! was written). Live rows from the match store are authoritative for those
//! fields, so bracket matches are overlaid with live state before any
//! placement decision is read off them. Topology (round membership, the
//! third-place flag) always comes from the snapshot.

use std::collections::HashMap;

use crate::models::{BracketMatch, MatchId, MatchRecord};

/// Build a lookup of live match rows by match ID.
pub fn live_index(live_matches: &[MatchRecord]) -> HashMap<MatchId, &MatchRecord> {
    live_matches.iter().map(|m| (m.id.clone(), m)).collect()
}

/// Overlay live state onto a snapshot match.
///
/// `status` is taken from the live row; `result`, `player1` and `player2`
/// are taken from the live row when populated there, falling back to the
/// snapshot otherwise. All other fields keep their snapshot values. A match
/// with no live row is returned unchanged; absence of live data is a
/// fallback, not an error.
pub fn freshen(snapshot: &BracketMatch, live: &HashMap<MatchId, &MatchRecord>) -> BracketMatch {
    let mut merged = snapshot.clone();
    if let Some(row) = live.get(&snapshot.id) {
        merged.status = row.status;
        merged.result = row.result.clone().or(merged.result.take());
        merged.player1 = row.player1.clone().or(merged.player1.take());
        merged.player2 = row.player2.clone().or(merged.player2.take());
    }
    merged
}
