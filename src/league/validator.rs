use std::collections::HashSet;

use super::{RankEntry, ValidationError, WeeklyResult};

/// Results that passed validation, ordered by rank. Ranks are exactly `1..=len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedResults {
    results: Vec<WeeklyResult>,
}

impl ValidatedResults {
    pub fn results(&self) -> &[WeeklyResult] {
        &self.results
    }

    pub fn rank_of(&self, player_id: &str) -> Option<u32> {
        self.results
            .iter()
            .find(|r| r.player_id == player_id)
            .map(|r| r.rank)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<WeeklyResult> {
        self.results
    }
}

pub struct ResultSetValidator;

impl ResultSetValidator {
    /// Checks a candidate result set. Entries without a positive rank are
    /// dropped as non-participants, then the remaining ranks must be unique
    /// and form `1..=k` with no gaps.
    pub fn validate(entries: &[RankEntry]) -> Result<ValidatedResults, ValidationError> {
        let mut ranked: Vec<(&str, i64)> = entries
            .iter()
            .filter_map(|entry| {
                entry
                    .rank
                    .filter(|rank| *rank > 0)
                    .map(|rank| (entry.player_id.as_str(), rank))
            })
            .collect();
        ranked.sort_by_key(|(_, rank)| *rank);

        if let Some(pair) = ranked.windows(2).find(|pair| pair[0].1 == pair[1].1) {
            return Err(ValidationError::DuplicateRank {
                rank: pair[0].1 as u64,
            });
        }

        for (index, (_, rank)) in ranked.iter().enumerate() {
            let expected = index as i64 + 1;
            if *rank != expected {
                return Err(ValidationError::NonSequentialRank {
                    expected: expected as u64,
                    found: *rank as u64,
                });
            }
        }

        if ranked.is_empty() {
            return Err(ValidationError::EmptyResultSet);
        }

        let mut seen = HashSet::new();
        if let Some((player_id, _)) = ranked.iter().find(|(id, _)| !seen.insert(*id)) {
            return Err(ValidationError::DuplicatePlayer {
                player_id: player_id.to_string(),
            });
        }

        // Ranks are now exactly 1..=len, so they fit in u32
        let results = ranked
            .into_iter()
            .map(|(player_id, rank)| WeeklyResult {
                player_id: player_id.to_string(),
                rank: rank as u32,
            })
            .collect();

        Ok(ValidatedResults { results })
    }
}

#[cfg(test)]
pub(crate) fn validated(ranks: &[(&str, i64)]) -> ValidatedResults {
    let entries: Vec<RankEntry> = ranks
        .iter()
        .map(|(id, rank)| RankEntry::new(*id, *rank))
        .collect();
    ResultSetValidator::validate(&entries).expect("test results should be valid")
}
