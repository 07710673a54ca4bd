use super::{calculator_priority, CalculationContext, ScoreCalculator};

/// Default flat award for showing up, regardless of placement
pub const DEFAULT_PARTICIPATION_BONUS: u32 = 20;

pub struct ParticipationBonusCalculator {
    bonus: u32,
}

impl Default for ParticipationBonusCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_PARTICIPATION_BONUS)
    }
}

impl ParticipationBonusCalculator {
    pub fn new(bonus: u32) -> Self {
        Self { bonus }
    }
}

impl ScoreCalculator for ParticipationBonusCalculator {
    fn calculate(&self, context: &CalculationContext) -> u32 {
        context.current_points.saturating_add(self.bonus)
    }

    fn priority(&self) -> u32 {
        calculator_priority::BONUS
    }
}
