pub mod handlers;
pub mod types;

use axum::{
    routing::{get, patch, put},
    Router,
};

use crate::shared::AppState;

/// All league routes. Reads come from the mirror, writes go through the service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ranking", get(handlers::get_ranking))
        .route(
            "/players",
            get(handlers::list_players).post(handlers::create_player),
        )
        .route(
            "/players/:id",
            patch(handlers::update_player).delete(handlers::delete_player),
        )
        .route(
            "/weeks",
            get(handlers::list_weeks).post(handlers::create_week),
        )
        .route(
            "/weeks/:id",
            put(handlers::edit_week).delete(handlers::delete_week),
        )
        .with_state(state)
}
