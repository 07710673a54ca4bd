use thiserror::Error;

use crate::store::{Collection, StoreError};

/// Problems with a submitted result set. Nothing is written when one is raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate rank found: {rank}. Every rank must be unique")]
    DuplicateRank { rank: u64 },

    #[error("Ranks must be sequential (1, 2, 3...): expected {expected}, found {found}")]
    NonSequentialRank { expected: u64, found: u64 },

    #[error("At least one valid rank is required")]
    EmptyResultSet,

    #[error("Player {player_id} is ranked more than once")]
    DuplicatePlayer { player_id: String },
}

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A player named {0} already exists")]
    DuplicatePlayerName(String),

    #[error("Player name must not be empty")]
    InvalidPlayerName,

    #[error("Invalid player update: {0}")]
    InvalidPatch(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Week not found: {0}")]
    WeekNotFound(String),

    #[error("Could not generate a record id: {0}")]
    IdentifierGeneration(StoreError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Timed out waiting for {0} data")]
    SnapshotTimeout(Collection),

    #[error("{collection} data unavailable: {reason}")]
    SnapshotUnavailable {
        collection: Collection,
        reason: String,
    },
}
