use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::league::{PlacementPointsTable, ScoringRules};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub placement_points: PlacementPointsTable,
    pub participation_bonus: u32,
    pub snapshot_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
        const DEFAULT_PARTICIPATION_BONUS: u32 = 20;
        const DEFAULT_SNAPSHOT_TIMEOUT_MS: u64 = 10_000;

        let bind_addr = lookup("LEAGUE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());

        let placement_points = match lookup("LEAGUE_PLACEMENT_POINTS") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                var: "LEAGUE_PLACEMENT_POINTS",
                reason: format!("{}", e),
            })?,
            None => PlacementPointsTable::standard(),
        };

        let participation_bonus = parse_number(
            &lookup,
            "LEAGUE_PARTICIPATION_BONUS",
            DEFAULT_PARTICIPATION_BONUS,
        )?;

        let snapshot_timeout_ms = parse_number(
            &lookup,
            "LEAGUE_SNAPSHOT_TIMEOUT_MS",
            DEFAULT_SNAPSHOT_TIMEOUT_MS,
        )?;
        if snapshot_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "LEAGUE_SNAPSHOT_TIMEOUT_MS",
                reason: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            bind_addr,
            placement_points,
            participation_bonus,
            snapshot_timeout: Duration::from_millis(snapshot_timeout_ms),
        })
    }

    pub fn scoring_rules(&self) -> ScoringRules {
        ScoringRules {
            placement_points: self.placement_points.clone(),
            participation_bonus: self.participation_bonus,
        }
    }
}

fn parse_number<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
