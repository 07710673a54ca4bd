use chrono::Utc;
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{LeagueError, Player, ScoringEngine, ValidatedResults, Week};
use crate::store::{
    records::{decode_snapshot, encode, StoredRecord},
    Collection, MultiUpdate, RealtimeStore, StoreError,
};

/// Reads the current content of a collection: the first delivery of a fresh
/// subscription, bounded by `timeout`.
pub(crate) async fn fetch_records<T: StoredRecord>(
    store: &dyn RealtimeStore,
    timeout: Duration,
) -> Result<Vec<T>, LeagueError> {
    let mut stream = store.subscribe(T::COLLECTION);
    match tokio::time::timeout(timeout, stream.next()).await {
        Err(_) => Err(LeagueError::SnapshotTimeout(T::COLLECTION)),
        Ok(None) => Err(StoreError::SubscriptionClosed(T::COLLECTION.to_string()).into()),
        Ok(Some(snapshot)) => Ok(decode_snapshot(&snapshot?)?),
    }
}

/// What removing a player did to the week history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRemoval {
    pub weeks_updated: Vec<String>,
    pub weeks_deleted: Vec<String>,
}

/// Owner of the week history.
///
/// Only `submit_new_week` scores. Editing or deleting a week rewrites the
/// history alone; totals already applied stay as they are until the operator
/// corrects them by hand.
pub struct WeekLedger {
    store: Arc<dyn RealtimeStore>,
    engine: Arc<ScoringEngine>,
    snapshot_timeout: Duration,
}

impl WeekLedger {
    pub fn new(
        store: Arc<dyn RealtimeStore>,
        engine: Arc<ScoringEngine>,
        snapshot_timeout: Duration,
    ) -> Self {
        Self {
            store,
            engine,
            snapshot_timeout,
        }
    }

    pub async fn players(&self) -> Result<Vec<Player>, LeagueError> {
        fetch_records(self.store.as_ref(), self.snapshot_timeout).await
    }

    pub async fn weeks(&self) -> Result<Vec<Week>, LeagueError> {
        fetch_records(self.store.as_ref(), self.snapshot_timeout).await
    }

    /// Scores a new week and writes it together with every changed player in
    /// one atomic update
    #[instrument(skip(self, results), fields(participants = results.len()))]
    pub async fn submit_new_week(
        &self,
        results: ValidatedResults,
        is_doubled: bool,
    ) -> Result<Week, LeagueError> {
        let players = self.players().await?;

        for result in results.results() {
            if !players.iter().any(|p| p.id == result.player_id) {
                warn!(player_id = %result.player_id, "Result references an unknown player");
            }
        }

        let updates = self.engine.apply(&players, &results, is_doubled);

        let week_id = self
            .store
            .generate_id(Collection::Weeks)
            .map_err(LeagueError::IdentifierGeneration)?;

        let week = Week {
            id: week_id,
            date: Utc::now(),
            results: results.into_results(),
            is_doubled,
        };

        let mut batch = MultiUpdate::new();
        for player in updates.values() {
            batch.insert(player.path(), encode(player)?);
        }
        batch.insert(week.path(), encode(&week)?);

        debug!(
            week_id = %week.id,
            player_updates = updates.len(),
            "Writing week and player aggregates"
        );
        self.store.atomic_multi_update(batch).await?;

        info!(
            week_id = %week.id,
            is_doubled,
            player_updates = updates.len(),
            "Week submitted"
        );
        Ok(week)
    }

    /// Replaces the results and doubling flag of a recorded week. Player
    /// aggregates are not recomputed.
    #[instrument(skip(self, results))]
    pub async fn edit_existing_week(
        &self,
        week_id: &str,
        results: ValidatedResults,
        is_doubled: bool,
    ) -> Result<(), LeagueError> {
        let week = self.find_week(week_id).await?;

        let partial = json!({
            "results": serde_json::to_value(results.results()).map_err(StoreError::from)?,
            "isDoubled": is_doubled,
        });
        self.store.update_path(&week.path(), partial).await?;

        info!(week_id, is_doubled, "Week edited, totals left as previously computed");
        Ok(())
    }

    /// Removes a week from the history without touching player aggregates
    #[instrument(skip(self))]
    pub async fn delete_week(&self, week_id: &str) -> Result<(), LeagueError> {
        let week = self.find_week(week_id).await?;
        self.store.remove_path(&week.path()).await?;

        info!(week_id, "Week deleted, totals left as previously computed");
        Ok(())
    }

    /// Deletes a player and strips them from every week. Weeks left without
    /// results are deleted. Everything is written in one atomic update.
    #[instrument(skip(self))]
    pub async fn remove_player(&self, player_id: &str) -> Result<PlayerRemoval, LeagueError> {
        let players = self.players().await?;
        let player = players
            .iter()
            .find(|p| p.id == player_id)
            .ok_or_else(|| LeagueError::PlayerNotFound(player_id.to_string()))?;

        let mut batch = MultiUpdate::new();
        batch.insert(player.path(), Value::Null);

        let mut removal = PlayerRemoval::default();
        for week in self.weeks().await? {
            if !week.involves(player_id) {
                continue;
            }

            let remaining: Vec<_> = week
                .results
                .iter()
                .filter(|r| r.player_id != player_id)
                .cloned()
                .collect();

            if remaining.is_empty() {
                batch.insert(week.path(), Value::Null);
                removal.weeks_deleted.push(week.id.clone());
            } else {
                batch.insert(
                    week.path().child("results"),
                    serde_json::to_value(&remaining).map_err(StoreError::from)?,
                );
                removal.weeks_updated.push(week.id.clone());
            }
        }

        self.store.atomic_multi_update(batch).await?;

        info!(
            player_id,
            weeks_updated = removal.weeks_updated.len(),
            weeks_deleted = removal.weeks_deleted.len(),
            "Player removed"
        );
        Ok(removal)
    }

    async fn find_week(&self, week_id: &str) -> Result<Week, LeagueError> {
        self.weeks()
            .await?
            .into_iter()
            .find(|w| w.id == week_id)
            .ok_or_else(|| LeagueError::WeekNotFound(week_id.to_string()))
    }
}
