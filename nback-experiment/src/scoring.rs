use crate::error::ScoringError;
use nback_core::{Classification, ResponseEvent, TrialSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Hit and false-alarm totals for one n-level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCounts {
    pub hits: u32,
    pub false_alarms: u32,
}

/// Per-level counters; they only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreCounters {
    levels: BTreeMap<u32, LevelCounts>,
}

impl ScoreCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the counter effect of `classification`; returns true if a
    /// counter moved.
    pub fn record(&mut self, n_level: u32, classification: Classification) -> bool {
        match classification {
            Classification::Hit => self.levels.entry(n_level).or_default().hits += 1,
            Classification::FalseAlarm => {
                self.levels.entry(n_level).or_default().false_alarms += 1
            }
            Classification::Miss | Classification::CorrectRejection | Classification::Unscored => {
                return false;
            }
        }
        true
    }

    pub fn get(&self, n_level: u32) -> LevelCounts {
        self.levels.get(&n_level).copied().unwrap_or_default()
    }

    pub fn hits(&self, n_level: u32) -> u32 {
        self.get(n_level).hits
    }

    pub fn false_alarms(&self, n_level: u32) -> u32 {
        self.get(n_level).false_alarms
    }

    pub fn merge(&mut self, other: &ScoreCounters) {
        for (&level, counts) in &other.levels {
            let entry = self.levels.entry(level).or_default();
            entry.hits += counts.hits;
            entry.false_alarms += counts.false_alarms;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, LevelCounts)> + '_ {
        self.levels.iter().map(|(&level, &counts)| (level, counts))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Scores the trials of a single run.
///
/// Each trial may be scored once; a second attempt is an error rather than a
/// second increment. Use a fresh scorer per run.
#[derive(Debug, Clone, Default)]
pub struct ResponseScorer {
    counters: ScoreCounters,
    scored: HashSet<usize>,
}

impl ResponseScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(
        &mut self,
        trial: &TrialSpec,
        event: &ResponseEvent,
    ) -> Result<Classification, ScoringError> {
        if event.trial_index != trial.position {
            return Err(ScoringError::TrialMismatch {
                trial: trial.position,
                event: event.trial_index,
            });
        }
        if !self.scored.insert(trial.position) {
            return Err(ScoringError::AlreadyScored {
                trial: trial.position,
            });
        }
        let classification = Classification::from_role(trial.role, event.pressed);
        self.counters.record(trial.n_level, classification);
        Ok(classification)
    }

    pub fn scored_count(&self) -> usize {
        self.scored.len()
    }

    pub fn counters(&self) -> &ScoreCounters {
        &self.counters
    }

    pub fn into_counters(self) -> ScoreCounters {
        self.counters
    }
}
