use super::{calculator_priority, CalculationContext, ScoreCalculator};

/// Doubles everything earned in a week flagged as doubled
pub struct DoubledWeekCalculator;

impl Default for DoubledWeekCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DoubledWeekCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl ScoreCalculator for DoubledWeekCalculator {
    fn calculate(&self, context: &CalculationContext) -> u32 {
        if context.is_doubled {
            context.current_points.saturating_mul(2)
        } else {
            context.current_points
        }
    }

    fn priority(&self) -> u32 {
        calculator_priority::MULTIPLIER
    }
}
