use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::types::{CreatePlayerRequest, WeekCreatedResponse, WeekRequest};
use crate::league::{Player, PlayerPatch, RankingView, Week};
use crate::shared::{AppError, AppState};

/// GET /ranking
#[instrument(name = "get_ranking", skip(state))]
pub async fn get_ranking(State(state): State<AppState>) -> Result<Json<RankingView>, AppError> {
    let ranking = state.mirror.ranking()?;
    Ok(Json(ranking))
}

/// GET /players
///
/// Players in registration order
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>, AppError> {
    Ok(Json(state.mirror.players()?))
}

/// POST /players
#[instrument(name = "create_player", skip(state, request))]
pub async fn create_player(
    State(state): State<AppState>,
    Json(request): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<Player>), AppError> {
    let player = state.league.add_player(&request.name).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// PATCH /players/:id
///
/// Manual correction of stored aggregates; only the fields sent are written
#[instrument(name = "update_player", skip(state, patch))]
pub async fn update_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(patch): Json<PlayerPatch>,
) -> Result<StatusCode, AppError> {
    state.league.update_player(&player_id, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /players/:id
#[instrument(name = "delete_player", skip(state))]
pub async fn delete_player(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removal = state.league.remove_player(&player_id).await?;
    info!(
        weeks_updated = removal.weeks_updated.len(),
        weeks_deleted = removal.weeks_deleted.len(),
        "Player removed"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /weeks
///
/// Week history, newest first
#[instrument(name = "list_weeks", skip(state))]
pub async fn list_weeks(State(state): State<AppState>) -> Result<Json<Vec<Week>>, AppError> {
    Ok(Json(state.mirror.weeks()?))
}

/// POST /weeks
#[instrument(name = "create_week", skip(state, request))]
pub async fn create_week(
    State(state): State<AppState>,
    Json(request): Json<WeekRequest>,
) -> Result<(StatusCode, Json<WeekCreatedResponse>), AppError> {
    let week = state
        .league
        .submit_week(&request.results, request.is_doubled)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(WeekCreatedResponse { week_id: week.id }),
    ))
}

/// PUT /weeks/:id
///
/// Replaces results and the doubled flag. Player totals are not recomputed.
#[instrument(name = "edit_week", skip(state, request))]
pub async fn edit_week(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
    Json(request): Json<WeekRequest>,
) -> Result<StatusCode, AppError> {
    state
        .league
        .edit_week(&week_id, &request.results, request.is_doubled)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /weeks/:id
#[instrument(name = "delete_week", skip(state))]
pub async fn delete_week(
    State(state): State<AppState>,
    Path(week_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.league.delete_week(&week_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
