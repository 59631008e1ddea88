//! Entity ID generation.
//!
//! Derived records (result rows) get deterministic SHA256-based IDs so that
//! recomputing them yields the same row identity. Entities created by users
//! (players, leagues) get random IDs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// An entity ID, either derived from a content hash or randomly generated.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Derive a deterministic ID from key fields. First 16 hex chars of the
    /// SHA256 over the `|`-joined fields; the separator keeps ("ab","c")
    /// distinct from ("a","bc").
    pub fn generate(fields: &[&str]) -> Self {
        let digest = Sha256::digest(fields.join("|").as_bytes());
        Self(hex::encode(digest)[..16].to_string())
    }

    /// A random ID for a freshly created entity.
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Type alias for league IDs
pub type LeagueId = EntityId;

/// Type alias for player IDs
pub type PlayerId = EntityId;

/// Type alias for tournament IDs
pub type TournamentId = EntityId;

/// Type alias for match IDs
pub type MatchId = EntityId;

/// Type alias for result row IDs
pub type ResultRowId = EntityId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_deterministic() {
        let id1 = EntityId::generate(&["league-a", "tournament-b", "player-c"]);
        let id2 = EntityId::generate(&["league-a", "tournament-b", "player-c"]);
        assert_eq!(id1, id2);

        let other = EntityId::generate(&["league-a", "tournament-b", "player-d"]);
        assert_ne!(id1, other);
    }

    #[test]
    fn test_generate_respects_field_boundaries() {
        assert_ne!(
            EntityId::generate(&["ab", "c"]),
            EntityId::generate(&["a", "bc"])
        );
    }

    #[test]
    fn test_generated_ids_are_short_hex() {
        let id = EntityId::generate(&["anything"]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_ids_unique() {
        assert_ne!(EntityId::random(), EntityId::random());
    }

    #[test]
    fn test_display_and_debug() {
        let id = EntityId::from("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(format!("{:?}", id), "EntityId(abc123)");
    }
}
