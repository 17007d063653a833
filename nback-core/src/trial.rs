use crate::stimulus::StimulusId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Role a position plays in the n-back relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialRole {
    /// One of the first n positions; nothing to compare against.
    Lead,
    Target,
    NonTarget,
}

impl TrialRole {
    pub fn is_scored(&self) -> bool {
        !matches!(self, TrialRole::Lead)
    }
}

/// One position of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSpec {
    pub position: usize,
    pub role: TrialRole,
    pub stimulus: StimulusId,
    pub n_level: u32,
}

/// Opaque identifier of the response key a participant must press on a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchKey(String);

impl MatchKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MatchKey {
    fn default() -> Self {
        Self::new("space")
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw key press reported by a presentation driver, latency measured from
/// stimulus onset.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyResponse {
    pub key: MatchKey,
    pub latency: Duration,
}

/// What the run controller recorded for a single trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEvent {
    pub trial_index: usize,
    pub reaction_time: Option<Duration>,
    pub pressed: bool,
}

impl ResponseEvent {
    pub fn no_response(trial_index: usize) -> Self {
        Self {
            trial_index,
            reaction_time: None,
            pressed: false,
        }
    }

    pub fn pressed(trial_index: usize, reaction_time: Duration) -> Self {
        Self {
            trial_index,
            reaction_time: Some(reaction_time),
            pressed: true,
        }
    }
}

/// Signal-detection outcome of a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
    Unscored,
}

impl Classification {
    pub fn from_role(role: TrialRole, responded: bool) -> Self {
        match (role, responded) {
            (TrialRole::Lead, _) => Classification::Unscored,
            (TrialRole::Target, true) => Classification::Hit,
            (TrialRole::Target, false) => Classification::Miss,
            (TrialRole::NonTarget, true) => Classification::FalseAlarm,
            (TrialRole::NonTarget, false) => Classification::CorrectRejection,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Classification::Hit)
    }

    pub fn is_false_alarm(&self) -> bool {
        matches!(self, Classification::FalseAlarm)
    }
}
