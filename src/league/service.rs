use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument};

use super::{
    ledger::fetch_records, LeagueError, Player, PlayerPatch, PlayerRemoval, RankEntry,
    ResultSetValidator, ScoringEngine, ScoringRules, Week, WeekLedger,
};
use crate::store::{
    records::{encode, StoredRecord},
    Collection, RealtimeStore, StoreError,
};

/// Administrative entry point for the league.
///
/// Validates operator input before anything is written and runs one mutation
/// at a time, so every read-modify-write sees the result of the previous one.
pub struct LeagueService {
    store: Arc<dyn RealtimeStore>,
    ledger: WeekLedger,
    snapshot_timeout: Duration,
    writes: AsyncMutex<()>,
}

impl LeagueService {
    pub fn new(
        store: Arc<dyn RealtimeStore>,
        rules: ScoringRules,
        snapshot_timeout: Duration,
    ) -> Self {
        let engine = Arc::new(ScoringEngine::new(rules));
        Self {
            ledger: WeekLedger::new(store.clone(), engine, snapshot_timeout),
            store,
            snapshot_timeout,
            writes: AsyncMutex::new(()),
        }
    }

    pub fn ledger(&self) -> &WeekLedger {
        &self.ledger
    }

    /// Registers a player with every counter at zero
    #[instrument(skip(self))]
    pub async fn add_player(&self, name: &str) -> Result<Player, LeagueError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LeagueError::InvalidPlayerName);
        }

        let _guard = self.writes.lock().await;
        let players = self.players().await?;
        if players.iter().any(|p| p.has_name(name)) {
            return Err(LeagueError::DuplicatePlayerName(name.to_string()));
        }

        let id = self
            .store
            .generate_id(Collection::Players)
            .map_err(LeagueError::IdentifierGeneration)?;
        let player = Player::new(id, name);
        self.store.set_path(&player.path(), encode(&player)?).await?;

        info!(player_id = %player.id, name = %player.name, "Player registered");
        Ok(player)
    }

    /// Writes the fields present in `patch` onto a player. This is how totals
    /// are corrected after a week is edited or deleted.
    #[instrument(skip(self, patch))]
    pub async fn update_player(&self, player_id: &str, patch: PlayerPatch) -> Result<(), LeagueError> {
        let _guard = self.writes.lock().await;
        let players = self.players().await?;
        let player = players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| LeagueError::PlayerNotFound(player_id.to_string()))?;

        let mut patch = patch;
        if let Some(name) = patch.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(LeagueError::InvalidPlayerName);
            }
            if players.iter().any(|p| p.id != player_id && p.has_name(&name)) {
                return Err(LeagueError::DuplicatePlayerName(name));
            }
            patch.name = Some(name);
        }

        if let Some(value) = patch.accumulated_value {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(LeagueError::InvalidPatch(format!(
                    "accumulated value cannot be negative: {}",
                    value
                )));
            }
        }

        if patch.is_empty() {
            debug!(player_id, "Empty player update, nothing written");
            return Ok(());
        }

        let partial: Value = serde_json::to_value(&patch).map_err(StoreError::from)?;
        self.store.update_path(&player.path(), partial).await?;

        info!(player_id, "Player updated manually");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_player(&self, player_id: &str) -> Result<PlayerRemoval, LeagueError> {
        let _guard = self.writes.lock().await;
        self.ledger.remove_player(player_id).await
    }

    /// Validates and scores a new week
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn submit_week(
        &self,
        entries: &[RankEntry],
        is_doubled: bool,
    ) -> Result<Week, LeagueError> {
        let results = ResultSetValidator::validate(entries)?;
        let _guard = self.writes.lock().await;
        self.ledger.submit_new_week(results, is_doubled).await
    }

    /// Validates and stores corrected results for a recorded week, without rescoring
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn edit_week(
        &self,
        week_id: &str,
        entries: &[RankEntry],
        is_doubled: bool,
    ) -> Result<(), LeagueError> {
        let results = ResultSetValidator::validate(entries)?;
        let _guard = self.writes.lock().await;
        self.ledger
            .edit_existing_week(week_id, results, is_doubled)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_week(&self, week_id: &str) -> Result<(), LeagueError> {
        let _guard = self.writes.lock().await;
        self.ledger.delete_week(week_id).await
    }

    async fn players(&self) -> Result<Vec<Player>, LeagueError> {
        fetch_records(self.store.as_ref(), self.snapshot_timeout).await
    }
}
