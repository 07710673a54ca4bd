use std::str::FromStr;
use thiserror::Error;

/// Default table: 1st place earns 130, 13th earns 1
pub const STANDARD_PLACEMENT_POINTS: [u32; 13] = [130, 100, 80, 50, 40, 30, 20, 10, 5, 4, 3, 2, 1];

/// Points for any placement past the end of the table
pub const FLOOR_POINTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementTableError {
    #[error("placement table must have at least one entry")]
    Empty,

    #[error("invalid placement points value: {0:?}")]
    InvalidValue(String),
}

/// Base points per 1-based placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementPointsTable {
    points: Vec<u32>,
}

impl Default for PlacementPointsTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PlacementPointsTable {
    pub fn new(points: Vec<u32>) -> Result<Self, PlacementTableError> {
        if points.is_empty() {
            return Err(PlacementTableError::Empty);
        }
        Ok(Self { points })
    }

    pub fn standard() -> Self {
        Self {
            points: STANDARD_PLACEMENT_POINTS.to_vec(),
        }
    }

    pub fn points_for(&self, rank: u32) -> u32 {
        rank.checked_sub(1)
            .and_then(|index| self.points.get(index as usize))
            .copied()
            .unwrap_or(FLOOR_POINTS)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromStr for PlacementPointsTable {
    type Err = PlacementTableError;

    /// Parses a comma-separated list such as `130,100,80`
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let points = raw
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<u32>()
                    .map_err(|_| PlacementTableError::InvalidValue(value.to_string()))
            })
            .collect::<Result<Vec<u32>, _>>()?;

        Self::new(points)
    }
}
