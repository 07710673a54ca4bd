// Library crate for the league results ledger
// This file exposes the public API for integration tests

pub mod api;
pub mod config;
pub mod league;
pub mod shared;
pub mod store;

// Re-export commonly used types for easier access in tests
pub use api::router;
pub use config::{Config, ConfigError};
pub use league::{
    LeagueError, LeagueMirror, LeagueService, Player, PlayerPatch, RankEntry, RankingView,
    ScoringRules, ValidationError, Week, WeekLedger,
};
pub use shared::{AppError, AppState};
pub use store::{InMemoryStore, RealtimeStore, StoreError};
