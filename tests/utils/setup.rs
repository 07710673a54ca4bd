use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use league_ledger::{
    api,
    league::{LeagueMirror, LeagueService, ScoringRules},
    shared::AppState,
    store::{InMemoryStore, RealtimeStore},
};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    /// Player name -> id for the players registered during setup
    pub player_ids: HashMap<String, String>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    store: Option<Arc<dyn RealtimeStore>>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            store: None,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol"])
    }

    pub fn with_store(mut self, store: Arc<dyn RealtimeStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> TestSetup {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let league = Arc::new(LeagueService::new(
            store.clone(),
            ScoringRules::default(),
            TEST_TIMEOUT,
        ));
        let mirror = Arc::new(LeagueMirror::spawn(store, TEST_TIMEOUT));
        let state = AppState::new(league, mirror);

        let mut player_ids = HashMap::new();
        for name in &self.players {
            let player = state.league.add_player(name).await.unwrap();
            player_ids.insert(name.clone(), player.id);
        }

        TestSetup {
            app: api::router(state.clone()),
            state,
            player_ids,
        }
    }
}
