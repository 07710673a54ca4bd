pub use doubled_week::DoubledWeekCalculator;
pub use participation_bonus::{ParticipationBonusCalculator, DEFAULT_PARTICIPATION_BONUS};
pub use placement_points::PlacementPointsCalculator;

mod doubled_week;
mod participation_bonus;
mod placement_points;

/// Priority constants for score calculators.
/// Lower values run first. Calculators with higher priority
/// see the points accumulated by lower-priority calculators.
pub mod calculator_priority {
    /// Points from the finishing position
    pub const BASE_SCORE: u32 = 100;
    /// Flat awards added on top of the base score
    pub const BONUS: u32 = 150;
    /// Multipliers applied to everything earned so far
    pub const MULTIPLIER: u32 = 200;
}

/// One stage of the weekly points pipeline for a ranked participant
pub trait ScoreCalculator: Send + Sync {
    fn calculate(&self, context: &CalculationContext) -> u32;

    fn priority(&self) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculationContext {
    pub rank: u32,
    pub is_doubled: bool,
    /// Points accumulated by the calculators that already ran
    pub current_points: u32,
}

impl CalculationContext {
    pub fn new(rank: u32, is_doubled: bool) -> Self {
        Self {
            rank,
            is_doubled,
            current_points: 0,
        }
    }

    pub fn with_points(self, current_points: u32) -> Self {
        Self {
            current_points,
            ..self
        }
    }
}
