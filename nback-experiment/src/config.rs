use crate::error::ConfigError;
use nback_core::{MatchKey, StimulusPool};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session parameters.
///
/// Every field has a default, so a JSON file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// One entry per run, in run order; levels may repeat.
    pub levels: Vec<u32>,
    pub target_count: usize,
    pub non_target_count: usize,
    /// Fixed presentation/response window per trial.
    pub presentation_ms: u64,
    pub match_key: MatchKey,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            levels: vec![1, 2, 2, 2, 3, 3, 3],
            target_count: 10,
            non_target_count: 20,
            presentation_ms: 2500,
            match_key: MatchKey::default(),
        }
    }
}

impl SessionConfig {
    pub fn presentation(&self) -> Duration {
        Duration::from_millis(self.presentation_ms)
    }

    /// Trials in a run at level `n`.
    pub fn run_length(&self, n: u32) -> usize {
        n as usize + self.target_count + self.non_target_count
    }

    /// Smallest pool that can satisfy every exclusion draw.
    pub fn min_pool_size(&self) -> usize {
        if self.non_target_count > 0 { 2 } else { 1 }
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks everything that can be known before the first run starts.
    pub fn validate(&self, pool: &StimulusPool) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoRuns);
        }
        if let Some(run) = self.levels.iter().position(|&n| n == 0) {
            return Err(ConfigError::ZeroLevel { run });
        }
        if self.presentation_ms == 0 {
            return Err(ConfigError::ZeroPresentation);
        }
        let required = self.min_pool_size();
        if pool.len() < required {
            return Err(ConfigError::PoolTooSmall {
                required,
                available: pool.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(size: usize) -> StimulusPool {
        StimulusPool::new((0..size).map(|i| format!("s{i}"))).unwrap()
    }

    #[test]
    fn defaults_describe_seven_runs_of_thirty_scored_trials() {
        let config = SessionConfig::default();
        assert_eq!(config.levels, vec![1, 2, 2, 2, 3, 3, 3]);
        assert_eq!(config.run_length(2), 32);
        assert_eq!(config.presentation(), Duration::from_millis(2500));
        assert!(config.validate(&pool(8)).is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config =
            SessionConfig::from_json_str(r#"{ "levels": [1, 2, 2, 3, 3], "target_count": 2 }"#)
                .unwrap();
        assert_eq!(config.levels, vec![1, 2, 2, 3, 3]);
        assert_eq!(config.target_count, 2);
        assert_eq!(config.non_target_count, 20);
        assert_eq!(config.match_key, MatchKey::new("space"));
    }

    #[test]
    fn negative_counts_do_not_deserialize() {
        assert!(SessionConfig::from_json_str(r#"{ "target_count": -1 }"#).is_err());
    }

    #[test]
    fn validation_rejects_bad_sessions() {
        let mut config = SessionConfig {
            levels: vec![1, 0, 2],
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(&pool(8)),
            Err(ConfigError::ZeroLevel { run: 1 })
        );

        config.levels.clear();
        assert_eq!(config.validate(&pool(8)), Err(ConfigError::NoRuns));

        config.levels = vec![2];
        config.presentation_ms = 0;
        assert_eq!(config.validate(&pool(8)), Err(ConfigError::ZeroPresentation));

        config.presentation_ms = 2500;
        assert_eq!(
            config.validate(&pool(1)),
            Err(ConfigError::PoolTooSmall {
                required: 2,
                available: 1
            })
        );

        config.non_target_count = 0;
        assert!(config.validate(&pool(1)).is_ok());
    }
}
