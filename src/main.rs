use league_ledger::{
    api,
    config::Config,
    league::{LeagueMirror, LeagueService},
    shared::AppState,
    store::InMemoryStore,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "league_ledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    info!(
        placement_entries = config.placement_points.len(),
        participation_bonus = config.participation_bonus,
        snapshot_timeout_ms = config.snapshot_timeout.as_millis() as u64,
        "Starting league ledger"
    );

    // Any RealtimeStore backend can be plugged in here
    let store = Arc::new(InMemoryStore::new());

    let league = Arc::new(LeagueService::new(
        store.clone(),
        config.scoring_rules(),
        config.snapshot_timeout,
    ));
    let mirror = Arc::new(LeagueMirror::spawn(store, config.snapshot_timeout));
    match mirror.settled().await {
        Ok(()) => info!("League data loaded"),
        Err(e) => warn!(error = %e, "League data not loaded; reads will fail"),
    }
    let app_state = AppState::new(league, mirror);

    let app = api::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %config.bind_addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    info!(bind_addr = %config.bind_addr, "Server running");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server stopped");
    }
}
