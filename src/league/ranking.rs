use rust_decimal::Decimal;

use super::{Player, RankingPlayer, RankingView};

pub struct RankingProjector;

impl RankingProjector {
    /// Orders players by total points, highest first. Equal totals keep the
    /// order they had in `players`, and every position gets its own rank.
    pub fn project(players: &[Player]) -> Vec<RankingPlayer> {
        let mut sorted: Vec<&Player> = players.iter().collect();
        sorted.sort_by(|a, b| b.total_points.cmp(&a.total_points));

        sorted
            .into_iter()
            .enumerate()
            .map(|(index, player)| RankingPlayer {
                player: player.clone(),
                rank: index + 1,
            })
            .collect()
    }

    /// Ranking plus the league's accumulated value. The total saturates at
    /// `Decimal::MAX`.
    pub fn summarize(players: &[Player]) -> RankingView {
        RankingView {
            players: Self::project(players),
            total_accumulated_value: players
                .iter()
                .fold(Decimal::ZERO, |total, p| total.saturating_add(p.accumulated_value)),
        }
    }
}
