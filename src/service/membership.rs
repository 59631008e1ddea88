//! League membership management.
//!
//! Players come into existence here: a member spec naming an unknown player
//! creates the player record on first reference.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{LeagueId, LeagueMember, MemberRole, Player, PlayerId};
use crate::storage::{LeagueStore, MemberPatch};

use super::ServiceError;

/// What to add as a league member: an existing player by ID, or a player by
/// name (created if no player with that name exists yet).
#[derive(Debug, Clone, Default)]
pub struct MemberSpec {
    pub player_id: Option<PlayerId>,
    pub name: Option<String>,
    pub role: Option<MemberRole>,
    pub is_active: Option<bool>,
}

pub struct MembershipService {
    store: Arc<dyn LeagueStore>,
}

impl MembershipService {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Add members to a league, resolving each spec to a player and
    /// upserting one membership row per (league, player). Specs with neither
    /// an ID nor a name are skipped.
    pub fn add_members(
        &self,
        league_id: &LeagueId,
        specs: &[MemberSpec],
    ) -> Result<Vec<LeagueMember>, ServiceError> {
        self.store
            .read_league(league_id)?
            .ok_or_else(|| ServiceError::not_found("league", league_id))?;

        let mut members = Vec::new();
        for spec in specs {
            let player_id = match (&spec.player_id, &spec.name) {
                (Some(id), _) => id.clone(),
                (None, Some(name)) => self.resolve_or_create_player(name)?,
                (None, None) => {
                    warn!("member spec without player id or name, skipping");
                    continue;
                }
            };

            let mut member = LeagueMember::new(league_id.clone(), player_id);
            if let Some(role) = spec.role {
                member.role = role;
            }
            if let Some(active) = spec.is_active {
                member.is_active = active;
            }
            members.push(member);
        }

        if !members.is_empty() {
            self.store.upsert_members(&members)?;
            info!(
                league = %league_id,
                count = members.len(),
                "added league members"
            );
        }
        Ok(members)
    }

    fn resolve_or_create_player(&self, name: &str) -> Result<PlayerId, ServiceError> {
        if let Some(existing) = self.store.find_player_by_name(name)? {
            debug!(player = %existing.id, name, "matched existing player by name");
            return Ok(existing.id);
        }
        let player = Player::new(name);
        self.store.insert_player(&player)?;
        info!(player = %player.id, name, "created player on first reference");
        Ok(player.id)
    }

    /// Mark a member as having left the league. Returns false when no such
    /// membership exists.
    pub fn remove_member(
        &self,
        league_id: &LeagueId,
        player_id: &PlayerId,
    ) -> Result<bool, ServiceError> {
        Ok(self.store.update_member(
            league_id,
            player_id,
            MemberPatch {
                is_active: Some(false),
                mark_left: Some(true),
                ..Default::default()
            },
        )?)
    }

    /// Patch a member's role/active flag.
    pub fn update_member(
        &self,
        league_id: &LeagueId,
        player_id: &PlayerId,
        patch: MemberPatch,
    ) -> Result<(), ServiceError> {
        let found = self.store.update_member(league_id, player_id, patch)?;
        if !found {
            return Err(ServiceError::not_found("league member", player_id));
        }
        Ok(())
    }

    pub fn list_members(&self, league_id: &LeagueId) -> Result<Vec<LeagueMember>, ServiceError> {
        Ok(self.store.list_members(league_id)?)
    }
}
