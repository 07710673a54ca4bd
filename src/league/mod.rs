pub mod calculators;
pub mod ledger;
pub mod mirror;
pub mod service;

mod errors;
pub mod models;
pub mod placement;
pub mod ranking;
pub mod scoring;
pub mod validator;

pub use errors::{LeagueError, ValidationError};
pub use ledger::{PlayerRemoval, WeekLedger};
pub use mirror::{LeagueMirror, SnapshotState};
pub use models::*;
pub use placement::{PlacementPointsTable, PlacementTableError, STANDARD_PLACEMENT_POINTS};
pub use ranking::RankingProjector;
pub use scoring::{PlayerUpdates, ScoreOutcome, ScoringEngine, ScoringEngineBuilder, ScoringRules};
pub use service::LeagueService;
pub use validator::{ResultSetValidator, ValidatedResults};
