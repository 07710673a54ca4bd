use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::{LeagueError, Player, RankingProjector, RankingView, Week};
use crate::store::{
    records::{decode_snapshot, StoredRecord},
    Collection, RealtimeStore,
};

/// Latest known content of a subscribed collection
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotState<T> {
    /// Nothing delivered yet
    Loading,
    Ready(Vec<T>),
    /// The subscription failed or never delivered in time
    Failed(String),
}

impl<T: Clone> SnapshotState<T> {
    fn records(&self, collection: Collection) -> Result<Vec<T>, LeagueError> {
        match self {
            SnapshotState::Ready(records) => Ok(records.clone()),
            SnapshotState::Loading => Err(LeagueError::SnapshotUnavailable {
                collection,
                reason: "still loading".to_string(),
            }),
            SnapshotState::Failed(reason) => Err(LeagueError::SnapshotUnavailable {
                collection,
                reason: reason.clone(),
            }),
        }
    }
}

/// Read-side copy of the league kept current by store subscriptions.
///
/// Every delivery replaces the whole collection. Dropping the mirror
/// unsubscribes.
pub struct LeagueMirror {
    players: watch::Receiver<SnapshotState<Player>>,
    weeks: watch::Receiver<SnapshotState<Week>>,
    tasks: Vec<JoinHandle<()>>,
}

impl LeagueMirror {
    pub fn spawn(store: Arc<dyn RealtimeStore>, load_timeout: Duration) -> Self {
        let (players_tx, players) = watch::channel(SnapshotState::Loading);
        let (weeks_tx, weeks) = watch::channel(SnapshotState::Loading);

        let tasks = vec![
            tokio::spawn(follow::<Player>(store.clone(), players_tx, load_timeout)),
            tokio::spawn(follow::<Week>(store, weeks_tx, load_timeout)),
        ];

        Self {
            players,
            weeks,
            tasks,
        }
    }

    /// Players in insertion order
    pub fn players(&self) -> Result<Vec<Player>, LeagueError> {
        self.players.borrow().records(Collection::Players)
    }

    pub fn ranking(&self) -> Result<RankingView, LeagueError> {
        Ok(RankingProjector::summarize(&self.players()?))
    }

    /// Week history, newest first, each week's results in rank order
    pub fn weeks(&self) -> Result<Vec<Week>, LeagueError> {
        let mut weeks = self.weeks.borrow().records(Collection::Weeks)?;
        weeks.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        for week in &mut weeks {
            week.sort_results();
        }
        Ok(weeks)
    }

    /// Receiver that changes whenever a new players snapshot is applied
    #[cfg(test)]
    pub fn watch_players(&self) -> watch::Receiver<SnapshotState<Player>> {
        self.players.clone()
    }

    /// Waits until both collections have left `Loading`. Fails if a
    /// follower stopped before publishing anything.
    pub async fn settled(&self) -> Result<(), LeagueError> {
        settle(self.players.clone(), Collection::Players).await?;
        settle(self.weeks.clone(), Collection::Weeks).await
    }
}

async fn settle<T>(
    mut state: watch::Receiver<SnapshotState<T>>,
    collection: Collection,
) -> Result<(), LeagueError> {
    match state
        .wait_for(|s| !matches!(s, SnapshotState::Loading))
        .await
    {
        Ok(_) => Ok(()),
        Err(err) => {
            error!(%collection, %err, "Follower stopped while loading");
            Err(LeagueError::SnapshotUnavailable {
                collection,
                reason: "follower stopped while loading".to_string(),
            })
        }
    }
}

impl Drop for LeagueMirror {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn follow<T>(
    store: Arc<dyn RealtimeStore>,
    state: watch::Sender<SnapshotState<T>>,
    load_timeout: Duration,
) where
    T: StoredRecord + Send + Sync + 'static,
{
    let collection = T::COLLECTION;
    let mut stream = store.subscribe(collection);

    // The first delivery is bounded; later ones may take arbitrarily long
    let first = match tokio::time::timeout(load_timeout, stream.next()).await {
        Ok(first) => first,
        Err(_) => {
            warn!(%collection, ?load_timeout, "No snapshot delivered in time");
            state.send_replace(SnapshotState::Failed(format!(
                "no {} data received within {:?}",
                collection, load_timeout
            )));
            stream.next().await
        }
    };

    let mut next = first;
    loop {
        match next {
            None => {
                warn!(%collection, "Subscription ended");
                // An earlier failure reason takes precedence
                state.send_if_modified(|current| {
                    if matches!(current, SnapshotState::Failed(_)) {
                        return false;
                    }
                    *current = SnapshotState::Failed(format!("{} subscription ended", collection));
                    true
                });
                return;
            }
            Some(Err(err)) => {
                error!(%collection, %err, "Subscription delivered an error");
                state.send_replace(SnapshotState::Failed(err.to_string()));
            }
            Some(Ok(snapshot)) => match decode_snapshot::<T>(&snapshot) {
                Ok(records) => {
                    debug!(%collection, records = records.len(), "Snapshot applied");
                    state.send_replace(SnapshotState::Ready(records));
                }
                Err(err) => {
                    error!(%collection, %err, "Snapshot could not be decoded");
                    state.send_replace(SnapshotState::Failed(err.to_string()));
                }
            },
        }
        next = stream.next().await;
    }
}
