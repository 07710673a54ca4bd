use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::{records::StoredRecord, Collection};

/// A registered league player and their running aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub total_points: u32,
    /// `total_points` as it stood before the most recent scoring event
    #[serde(default)]
    pub previous_total_points: u32,
    #[serde(default)]
    pub presence: u32,
    #[serde(default)]
    pub wins: u32,
    /// Points earned in the latest week this player was scored for
    #[serde(default)]
    pub points_today: u32,
    /// Currency balance edited by the operator; scoring never touches it
    #[serde(default)]
    pub accumulated_value: Decimal,
}

impl Player {
    /// A freshly registered player with every counter at zero
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            total_points: 0,
            previous_total_points: 0,
            presence: 0,
            wins: 0,
            points_today: 0,
            accumulated_value: Decimal::ZERO,
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

impl StoredRecord for Player {
    const COLLECTION: Collection = Collection::Players;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyResult {
    pub player_id: String,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    #[serde(default)]
    pub id: String,
    /// Set when the week is submitted, never changed by edits
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub results: Vec<WeeklyResult>,
    #[serde(default)]
    pub is_doubled: bool,
}

impl Week {
    pub fn involves(&self, player_id: &str) -> bool {
        self.results.iter().any(|r| r.player_id == player_id)
    }

    pub fn sort_results(&mut self) {
        self.results.sort_by_key(|r| r.rank);
    }
}

impl StoredRecord for Week {
    const COLLECTION: Collection = Collection::Weeks;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A player with their position in the league table. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingPlayer {
    #[serde(flatten)]
    pub player: Player,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    pub players: Vec<RankingPlayer>,
    pub total_accumulated_value: Decimal,
}

/// One row of a result form as typed by the operator.
///
/// Players left blank (`rank: None`) or given a non-positive rank did not take part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub player_id: String,
    #[serde(default)]
    pub rank: Option<i64>,
}

impl RankEntry {
    pub fn new(player_id: impl Into<String>, rank: i64) -> Self {
        Self {
            player_id: player_id.into(),
            rank: Some(rank),
        }
    }

    pub fn blank(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            rank: None,
        }
    }
}

/// Manual correction of a player's stored fields. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_total_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_today: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulated_value: Option<Decimal>,
}

impl PlayerPatch {
    pub fn is_empty(&self) -> bool {
        *self == PlayerPatch::default()
    }
}
