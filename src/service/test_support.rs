//! Shared fixtures for service tests.

use chrono::Utc;

use crate::models::{
    BracketMatch, BracketRound, Group, GroupStanding, League, MatchResult, MatchStatus,
    PlayerSlot, PlayoffBracket, Tournament, TournamentFormat, TournamentStatus,
};
use crate::storage::{JsonlStore, LeagueStore};

/// A store seeded with league `l1` carrying the standard scoring table.
pub fn seeded_store() -> (tempfile::TempDir, JsonlStore) {
    let tmp = tempfile::tempdir().unwrap();
    let store = JsonlStore::from_dir(tmp.path());
    let mut league = League::new("Thursday League");
    league.id = "l1".into();
    store.insert_league(&league).unwrap();
    (tmp, store)
}

fn decided(id: &str, p1: &str, p2: &str, winner: &str) -> BracketMatch {
    BracketMatch {
        id: id.into(),
        player1: Some(PlayerSlot::new(p1)),
        player2: Some(PlayerSlot::new(p2)),
        status: MatchStatus::Completed,
        result: Some(MatchResult {
            winner: winner.into(),
        }),
        is_third_place_match: false,
    }
}

fn standing(player: &str, points: i64, legs_won: u32, legs_lost: u32, avg: f64) -> GroupStanding {
    GroupStanding {
        player: PlayerSlot::new(player),
        points,
        legs_won,
        legs_lost,
        average: avg,
    }
}

/// A completed seven-player tournament: quarterfinals p1/p5 and p2/p6,
/// semifinals p1/p3 and p2/p4, final won by p1, third-place match won by p3,
/// and a group-only non-qualifier p7. Yields placements p1..p7 = 1..7.
pub fn completed_playoff_tournament(id: &str, league: Option<&str>) -> Tournament {
    let mut third = decided(&format!("{id}_third"), "p3", "p4", "p3");
    third.is_third_place_match = true;
    let bracket = PlayoffBracket {
        rounds: vec![
            BracketRound {
                name: Some("Quarterfinals".to_string()),
                matches: vec![
                    decided(&format!("{id}_q1"), "p1", "p5", "p1"),
                    decided(&format!("{id}_q2"), "p2", "p6", "p2"),
                ],
            },
            BracketRound {
                name: Some("Semifinals".to_string()),
                matches: vec![
                    decided(&format!("{id}_s1"), "p1", "p3", "p1"),
                    decided(&format!("{id}_s2"), "p2", "p4", "p2"),
                ],
            },
            BracketRound {
                name: Some("Final".to_string()),
                matches: vec![decided(&format!("{id}_f"), "p1", "p2", "p1"), third],
            },
        ],
    };

    let groups = vec![Group {
        name: "Group A".to_string(),
        standings: vec![
            standing("p1", 9, 9, 2, 60.0),
            standing("p2", 7, 8, 3, 55.0),
            standing("p3", 6, 7, 4, 52.0),
            standing("p4", 5, 6, 5, 50.0),
            standing("p5", 4, 5, 6, 48.0),
            standing("p6", 3, 4, 7, 45.0),
            standing("p7", 0, 1, 10, 30.0),
        ],
    }];

    Tournament {
        id: id.into(),
        name: format!("Tournament {id}"),
        format: TournamentFormat::GroupsWithPlayoffs,
        status: TournamentStatus::Completed,
        league_id: league.map(|l| l.into()),
        league_points_calculated: false,
        players: (1..=7).map(|i| PlayerSlot::new(format!("p{i}"))).collect(),
        groups,
        playoffs: Some(bracket),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
