use crate::scoring::ScoreCounters;
use nback_core::{Classification, ResponseEvent, StimulusId, TrialRole, TrialSpec};
use serde::{Deserialize, Serialize};

/// Outcome of one finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub n_level: u32,
    pub trials: Vec<TrialSpec>,
    pub events: Vec<ResponseEvent>,
    pub classifications: Vec<Classification>,
}

/// Classification totals of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    pub correct_rejections: usize,
    pub unscored: usize,
}

/// Flat per-trial row for export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    pub run_index: usize,
    pub n_level: u32,
    pub trial_index: usize,
    pub role: TrialRole,
    pub stimulus: StimulusId,
    pub reaction_time_ms: Option<f64>,
    pub responded: bool,
    pub classification: Classification,
    /// Only set on target trials.
    pub hit: Option<bool>,
    /// Only set on non-target trials.
    pub false_alarm: Option<bool>,
}

impl RunResult {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for classification in &self.classifications {
            match classification {
                Classification::Hit => tally.hits += 1,
                Classification::Miss => tally.misses += 1,
                Classification::FalseAlarm => tally.false_alarms += 1,
                Classification::CorrectRejection => tally.correct_rejections += 1,
                Classification::Unscored => tally.unscored += 1,
            }
        }
        tally
    }

    pub fn records(&self, run_index: usize) -> Vec<TrialRecord> {
        self.trials
            .iter()
            .zip(&self.events)
            .zip(&self.classifications)
            .map(|((trial, event), &classification)| TrialRecord {
                run_index,
                n_level: self.n_level,
                trial_index: trial.position,
                role: trial.role,
                stimulus: trial.stimulus.clone(),
                reaction_time_ms: event.reaction_time.map(|rt| rt.as_secs_f64() * 1e3),
                responded: event.pressed,
                classification,
                hit: (trial.role == TrialRole::Target).then(|| classification.is_hit()),
                false_alarm: (trial.role == TrialRole::NonTarget)
                    .then(|| classification.is_false_alarm()),
            })
            .collect()
    }
}

/// Everything a session produced, in run order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub runs: Vec<RunResult>,
    pub counters: ScoreCounters,
}

impl SessionSummary {
    pub fn levels(&self) -> Vec<u32> {
        self.runs.iter().map(|run| run.n_level).collect()
    }

    pub fn records(&self) -> Vec<TrialRecord> {
        self.runs
            .iter()
            .enumerate()
            .flat_map(|(index, run)| run.records(index))
            .collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn run() -> RunResult {
        let trials = vec![
            (TrialRole::Lead, "B"),
            (TrialRole::Target, "B"),
            (TrialRole::NonTarget, "C"),
        ]
        .into_iter()
        .enumerate()
        .map(|(position, (role, id))| TrialSpec {
            position,
            role,
            stimulus: StimulusId::new(id),
            n_level: 1,
        })
        .collect();
        RunResult {
            n_level: 1,
            trials,
            events: vec![
                ResponseEvent::no_response(0),
                ResponseEvent::pressed(1, Duration::from_millis(512)),
                ResponseEvent::no_response(2),
            ],
            classifications: vec![
                Classification::Unscored,
                Classification::Hit,
                Classification::CorrectRejection,
            ],
        }
    }

    #[test]
    fn tally_counts_each_outcome() {
        let tally = run().tally();
        assert_eq!(tally.hits, 1);
        assert_eq!(tally.correct_rejections, 1);
        assert_eq!(tally.unscored, 1);
        assert_eq!(tally.misses + tally.false_alarms, 0);
    }

    #[test]
    fn records_flag_hits_only_on_targets() {
        let records = run().records(4);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].hit, None);
        assert_eq!(records[0].false_alarm, None);
        assert_eq!(records[1].hit, Some(true));
        assert_eq!(records[1].reaction_time_ms, Some(512.0));
        assert_eq!(records[2].false_alarm, Some(false));
        assert!(records.iter().all(|r| r.run_index == 4));
    }

    #[test]
    fn summary_serializes_counters_by_level() {
        let mut counters = ScoreCounters::new();
        counters.record(1, Classification::Hit);
        let summary = SessionSummary {
            runs: vec![run()],
            counters,
        };
        let json: serde_json::Value = serde_json::from_str(&summary.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["counters"]["1"]["hits"], 1);
        assert_eq!(json["runs"][0]["n_level"], 1);
    }
}
