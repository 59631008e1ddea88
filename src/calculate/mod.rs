//! Placement and scoring computation.
//!
//! Pure functions over tournament data:
//! - Freshness overlay of live match state onto bracket snapshots
//! - Placement extraction from brackets and group standings
//! - Placement-to-points resolution
//! - Leaderboard aggregation from result rows

pub mod overlay;
pub mod placements;

pub use overlay::{freshen, live_index};
pub use placements::extract_placements;

use std::collections::BTreeMap;

use chrono::Utc;

use crate::models::{
    LeaderboardEntry, LeagueId, PlacementPoints, PlacementRecord, PlayerId, ScoredResult,
};

/// Resolve the points a placement earns under a rule table.
pub fn resolve_points(table: &PlacementPoints, placement: &PlacementRecord) -> i64 {
    table.resolve(placement)
}

/// Aggregate result rows into leaderboard entries, one per player.
///
/// Totals are sums, placements give best (min) / worst (max) / unrounded
/// mean, and the latest tournament timestamp is carried for recency display.
/// Entries come back ordered by total points descending, then average
/// placement ascending.
pub fn aggregate_leaderboard(
    league_id: &LeagueId,
    results: &[ScoredResult],
) -> Vec<LeaderboardEntry> {
    let mut by_player: BTreeMap<PlayerId, Vec<&ScoredResult>> = BTreeMap::new();
    for result in results {
        by_player
            .entry(result.row.player_id.clone())
            .or_default()
            .push(result);
    }

    let now = Utc::now();
    let mut entries: Vec<LeaderboardEntry> = by_player
        .into_iter()
        .map(|(player_id, rows)| {
            let total_points: i64 = rows.iter().map(|r| r.row.points_awarded).sum();
            let placements: Vec<u32> = rows.iter().map(|r| r.row.placement).collect();
            let best_placement = placements.iter().min().copied();
            let worst_placement = placements.iter().max().copied();
            let avg_placement = if placements.is_empty() {
                None
            } else {
                Some(placements.iter().map(|&p| f64::from(p)).sum::<f64>() / placements.len() as f64)
            };
            let last_tournament_at = rows.iter().filter_map(|r| r.tournament_at).max();

            LeaderboardEntry {
                league_id: league_id.clone(),
                player_id,
                total_points,
                tournaments_played: rows.len() as u32,
                best_placement,
                worst_placement,
                avg_placement,
                last_tournament_at,
                updated_at: now,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_points.cmp(&a.total_points).then_with(|| {
            a.avg_placement
                .partial_cmp(&b.avg_placement)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlacementKey, ResultRow};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn scored(
        player: &str,
        tournament: &str,
        placement: u32,
        points: i64,
        days_ago: i64,
    ) -> ScoredResult {
        ScoredResult {
            row: ResultRow::new(
                "l1".into(),
                tournament.into(),
                player.into(),
                placement,
                points,
            ),
            tournament_at: Some(Utc::now() - Duration::days(days_ago)),
        }
    }

    #[test]
    fn test_resolve_points_delegates_to_table() {
        let table: PlacementPoints = [
            (PlacementKey::Literal(1), 5),
            (PlacementKey::PlayoffDefault, 1),
            (PlacementKey::Default, 0),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            resolve_points(&table, &PlacementRecord::new("p", 1, true)),
            5
        );
        assert_eq!(
            resolve_points(&table, &PlacementRecord::new("p", 7, true)),
            1
        );
        assert_eq!(
            resolve_points(&table, &PlacementRecord::new("p", 7, false)),
            0
        );
    }

    #[test]
    fn test_aggregate_single_player() {
        let results = vec![
            scored("p1", "t1", 1, 5, 3),
            scored("p1", "t2", 2, 3, 2),
            scored("p1", "t3", 4, 1, 1),
        ];
        let entries = aggregate_leaderboard(&"l1".into(), &results);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.total_points, 9);
        assert_eq!(entry.tournaments_played, 3);
        assert_eq!(entry.best_placement, Some(1));
        assert_eq!(entry.worst_placement, Some(4));
        let avg = entry.avg_placement.unwrap();
        assert!((avg - 7.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            entry.last_tournament_at,
            results[2].tournament_at,
            "most recent tournament wins"
        );
    }

    #[test]
    fn test_aggregate_orders_by_points_then_avg() {
        let results = vec![
            scored("p1", "t1", 2, 4, 2),
            scored("p2", "t1", 1, 5, 2),
            scored("p3", "t1", 3, 4, 2),
            // p1 and p3 tie on points; p1's better average placement wins.
            scored("p1", "t2", 2, 0, 1),
            scored("p3", "t2", 4, 0, 1),
        ];
        let entries = aggregate_leaderboard(&"l1".into(), &results);

        let order: Vec<&str> = entries.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(order, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_aggregate_empty_results() {
        let entries = aggregate_leaderboard(&"l1".into(), &[]);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_aggregate_missing_timestamps() {
        let mut result = scored("p1", "t1", 1, 5, 0);
        result.tournament_at = None;
        let entries = aggregate_leaderboard(&"l1".into(), &[result]);
        assert_eq!(entries[0].last_tournament_at, None);
    }
}
