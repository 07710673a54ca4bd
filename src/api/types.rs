use serde::{Deserialize, Serialize};

use crate::league::RankEntry;

/// Request payload for registering a player
#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

/// Result form for recording or correcting a week.
///
/// Rows with no rank (or a rank of zero or less) are players who sat out.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRequest {
    pub results: Vec<RankEntry>,
    #[serde(default)]
    pub is_doubled: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekCreatedResponse {
    pub week_id: String,
}
