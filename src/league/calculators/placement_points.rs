use super::{calculator_priority, CalculationContext, ScoreCalculator};
use crate::league::PlacementPointsTable;

pub struct PlacementPointsCalculator {
    table: PlacementPointsTable,
}

impl PlacementPointsCalculator {
    pub fn new(table: PlacementPointsTable) -> Self {
        Self { table }
    }
}

impl ScoreCalculator for PlacementPointsCalculator {
    fn calculate(&self, context: &CalculationContext) -> u32 {
        context
            .current_points
            .saturating_add(self.table.points_for(context.rank))
    }

    fn priority(&self) -> u32 {
        calculator_priority::BASE_SCORE
    }
}
