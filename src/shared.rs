use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use crate::league::{LeagueError, LeagueMirror, LeagueService};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    /// Write side: validation, scoring and persistence
    pub league: Arc<LeagueService>,
    /// Read side: subscription-fed view of players and weeks
    pub mirror: Arc<LeagueMirror>,
}

impl AppState {
    pub fn new(league: Arc<LeagueService>, mirror: Arc<LeagueMirror>) -> Self {
        Self { league, mirror }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    League(#[from] LeagueError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::League(err) => match err {
                LeagueError::Validation(_)
                | LeagueError::InvalidPlayerName
                | LeagueError::InvalidPatch(_) => StatusCode::BAD_REQUEST,
                LeagueError::DuplicatePlayerName(_) => StatusCode::CONFLICT,
                LeagueError::PlayerNotFound(_) | LeagueError::WeekNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                LeagueError::SnapshotTimeout(_) | LeagueError::SnapshotUnavailable { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                LeagueError::IdentifierGeneration(_) | LeagueError::Persistence(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.to_string();

        if status.is_server_error() {
            error!(status = %status, error = %error_message, "Request failed");
        } else {
            warn!(status = %status, error = %error_message, "Request rejected");
        }

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
