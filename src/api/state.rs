use std::sync::Arc;

use crate::service::{
    LeaderboardService, LinkageService, MembershipService, PlayerMergeService,
};
use crate::storage::LeagueStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeagueStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    pub fn leaderboard(&self) -> LeaderboardService {
        LeaderboardService::new(self.store.clone())
    }

    pub fn linkage(&self) -> LinkageService {
        LinkageService::new(self.store.clone())
    }

    pub fn membership(&self) -> MembershipService {
        MembershipService::new(self.store.clone())
    }

    pub fn merge(&self) -> PlayerMergeService {
        PlayerMergeService::new(self.store.clone())
    }
}
