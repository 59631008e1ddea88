//! Player model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, PlayerId};

/// A player. Created on first reference (league membership or explicit add),
/// and possibly merged into another player later; merge is irreversible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Create a new player with a random ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::random(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a player with a known ID (imports, tests).
    pub fn with_id(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_players_get_distinct_ids() {
        let a = Player::new("Alice");
        let b = Player::new("Alice");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_with_id_keeps_id() {
        let p = Player::with_id("p1".into(), "Bob");
        assert_eq!(p.id.as_str(), "p1");
        assert_eq!(p.name, "Bob");
    }
}
