//! League scoring rules.
//!
//! The rule table maps placement keys to point values. Keys are either a
//! literal placement number or one of two sentinel categories, serialized
//! with the wire names the surrounding app uses (`"1"`, `"playoffDefault"`,
//! `"default"`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::PlacementRecord;

/// A key in the scoring rule table.
///
/// Ordered so literal placements sort numerically ahead of the sentinels,
/// which keeps serialized tables stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlacementKey {
    /// An explicit placement number (1-based).
    Literal(u32),
    /// Playoff participants without an explicit numeric rule.
    PlayoffDefault,
    /// Catch-all for everyone else.
    Default,
}

impl fmt::Display for PlacementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementKey::Literal(n) => write!(f, "{}", n),
            PlacementKey::PlayoffDefault => write!(f, "playoffDefault"),
            PlacementKey::Default => write!(f, "default"),
        }
    }
}

/// Error parsing a placement key from its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlacementKeyError(String);

impl fmt::Display for ParsePlacementKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid placement key: {:?}", self.0)
    }
}

impl std::error::Error for ParsePlacementKeyError {}

impl FromStr for PlacementKey {
    type Err = ParsePlacementKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "playoffDefault" => Ok(PlacementKey::PlayoffDefault),
            "default" => Ok(PlacementKey::Default),
            other => other
                .parse::<u32>()
                .map(PlacementKey::Literal)
                .map_err(|_| ParsePlacementKeyError(other.to_string())),
        }
    }
}

/// The placement-to-points rule table.
///
/// Resolution order is literal key, then `playoffDefault` (only for playoff
/// participants), then `default`, then 0. Resolution is total: a missing or
/// empty table resolves every placement to 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlacementPoints(BTreeMap<PlacementKey, i64>);

impl PlacementPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock table new leagues start with.
    pub fn standard() -> Self {
        let mut table = BTreeMap::new();
        table.insert(PlacementKey::Literal(1), 5);
        table.insert(PlacementKey::Literal(2), 4);
        table.insert(PlacementKey::Literal(3), 3);
        table.insert(PlacementKey::Literal(4), 2);
        table.insert(PlacementKey::PlayoffDefault, 1);
        table.insert(PlacementKey::Default, 0);
        Self(table)
    }

    pub fn set(&mut self, key: PlacementKey, points: i64) {
        self.0.insert(key, points);
    }

    pub fn get(&self, key: &PlacementKey) -> Option<i64> {
        self.0.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve a placement record to its point value.
    pub fn resolve(&self, placement: &PlacementRecord) -> i64 {
        if let Some(points) = self.get(&PlacementKey::Literal(placement.placement)) {
            return points;
        }
        if placement.in_playoff {
            if let Some(points) = self.get(&PlacementKey::PlayoffDefault) {
                return points;
            }
        }
        if let Some(points) = self.get(&PlacementKey::Default) {
            return points;
        }
        0
    }
}

impl FromIterator<(PlacementKey, i64)> for PlacementPoints {
    fn from_iter<I: IntoIterator<Item = (PlacementKey, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for PlacementPoints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(&key.to_string(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PlacementPoints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyedMapVisitor;

        impl<'de> Visitor<'de> for KeyedMapVisitor {
            type Value = PlacementPoints;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of placement keys to point values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = BTreeMap::new();
                while let Some((key, value)) = access.next_entry::<String, i64>()? {
                    let key = key.parse::<PlacementKey>().map_err(de::Error::custom)?;
                    table.insert(key, value);
                }
                Ok(PlacementPoints(table))
            }
        }

        deserializer.deserialize_map(KeyedMapVisitor)
    }
}

/// A league's scoring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(rename = "placementPoints", default)]
    pub placement_points: PlacementPoints,

    /// Whether admins may patch leaderboard totals directly. Stored for the
    /// admin surface; the engine itself does not enforce it.
    #[serde(rename = "allowManualOverride", default = "default_true")]
    pub allow_manual_override: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            placement_points: PlacementPoints::standard(),
            allow_manual_override: true,
        }
    }
}
