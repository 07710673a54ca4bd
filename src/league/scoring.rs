use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    calculators::{
        CalculationContext, DoubledWeekCalculator, ParticipationBonusCalculator,
        PlacementPointsCalculator, ScoreCalculator, DEFAULT_PARTICIPATION_BONUS,
    },
    PlacementPointsTable, Player, ValidatedResults,
};

/// Player id -> full updated record, only for players whose state changed
pub type PlayerUpdates = BTreeMap<String, Player>;

/// Tunable parts of the points formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRules {
    pub placement_points: PlacementPointsTable,
    pub participation_bonus: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            placement_points: PlacementPointsTable::standard(),
            participation_bonus: DEFAULT_PARTICIPATION_BONUS,
        }
    }
}

/// What scoring a week means for one player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// Ranked this week; aggregates advanced
    Participated(Player),
    /// Sat out after scoring last time; `points_today` cleared
    PointsTodayCleared(Player),
    /// Sat out with nothing to clear
    Unchanged,
}

impl ScoreOutcome {
    pub fn into_update(self) -> Option<Player> {
        match self {
            ScoreOutcome::Participated(player) | ScoreOutcome::PointsTodayCleared(player) => {
                Some(player)
            }
            ScoreOutcome::Unchanged => None,
        }
    }
}

/// Turns a validated week into new player aggregates. Holds no state
/// between calls.
pub struct ScoringEngine {
    calculators: Vec<Arc<dyn ScoreCalculator>>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringRules::default())
    }
}

impl ScoringEngine {
    pub fn new(rules: ScoringRules) -> Self {
        Self::builder(rules).build()
    }

    pub fn builder(rules: ScoringRules) -> ScoringEngineBuilder {
        ScoringEngineBuilder::new(rules)
    }

    /// Points a participant earns for finishing at `rank`
    pub fn week_points(&self, rank: u32, is_doubled: bool) -> u32 {
        let context = CalculationContext::new(rank, is_doubled);
        self.calculators
            .iter()
            .fold(0, |points, calculator| {
                calculator.calculate(&context.with_points(points))
            })
    }

    pub fn score_player(&self, player: &Player, rank: Option<u32>, is_doubled: bool) -> ScoreOutcome {
        match rank {
            Some(rank) => {
                let week_total = self.week_points(rank, is_doubled);
                ScoreOutcome::Participated(Player {
                    previous_total_points: player.total_points,
                    total_points: player.total_points.saturating_add(week_total),
                    points_today: week_total,
                    presence: player.presence.saturating_add(1),
                    wins: if rank == 1 {
                        player.wins.saturating_add(1)
                    } else {
                        player.wins
                    },
                    ..player.clone()
                })
            }
            None if player.points_today == 0 => ScoreOutcome::Unchanged,
            None => ScoreOutcome::PointsTodayCleared(Player {
                previous_total_points: player.total_points,
                points_today: 0,
                ..player.clone()
            }),
        }
    }

    /// Scores every player against a week's results. Players with nothing to
    /// change are left out of the mapping so they are not rewritten.
    pub fn apply(
        &self,
        players: &[Player],
        results: &ValidatedResults,
        is_doubled: bool,
    ) -> PlayerUpdates {
        players
            .iter()
            .filter_map(|player| {
                self.score_player(player, results.rank_of(&player.id), is_doubled)
                    .into_update()
                    .map(|updated| (player.id.clone(), updated))
            })
            .collect()
    }
}

pub struct ScoringEngineBuilder {
    calculators: Vec<Arc<dyn ScoreCalculator>>,
}

impl ScoringEngineBuilder {
    fn new(rules: ScoringRules) -> Self {
        Self {
            calculators: vec![
                Arc::new(PlacementPointsCalculator::new(rules.placement_points)),
                Arc::new(ParticipationBonusCalculator::new(rules.participation_bonus)),
                Arc::new(DoubledWeekCalculator::new()),
            ],
        }
    }

    pub fn with_calculator(mut self, calculator: Arc<dyn ScoreCalculator>) -> Self {
        self.calculators.push(calculator);
        self
    }

    pub fn build(mut self) -> ScoringEngine {
        self.calculators.sort_by_key(|c| c.priority());
        ScoringEngine {
            calculators: self.calculators,
        }
    }
}
