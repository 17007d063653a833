// report.rs

use anyhow::{Context, Result};
use nback_experiment::{SessionConfig, SessionSummary, TrialRecord};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::stimuli::StimulusSet;

/// Results file: to be saved/exported
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub seed: u64,
    pub stimuli: StimulusSet,
    pub config: &'a SessionConfig,
    pub summary: &'a SessionSummary,
    pub trials: Vec<TrialRecord>,
}

impl<'a> Report<'a> {
    pub fn new(
        seed: u64,
        stimuli: StimulusSet,
        config: &'a SessionConfig,
        summary: &'a SessionSummary,
    ) -> Self {
        Self {
            seed,
            stimuli,
            config,
            summary,
            trials: summary.records(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Cannot create result file {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write results")?;
        info!("Results saved to {}", path.display());
        Ok(())
    }
}

/// Logs per-run tallies and mean reaction times.
pub fn log_summary(summary: &SessionSummary) {
    for (index, run) in summary.runs.iter().enumerate() {
        let tally = run.tally();
        let times: Vec<f64> = run
            .events
            .iter()
            .filter_map(|e| e.reaction_time)
            .map(|rt| rt.as_secs_f64() * 1e3)
            .collect();
        let mean = if times.is_empty() {
            0.0
        } else {
            times.iter().sum::<f64>() / times.len() as f64
        };
        info!(
            "Run {} ({}-back): hits {}, misses {}, false alarms {}, correct rejections {}, mean RT {:.1} ms",
            index + 1,
            run.n_level,
            tally.hits,
            tally.misses,
            tally.false_alarms,
            tally.correct_rejections,
            mean,
        );
    }
    for (level, counts) in summary.counters.iter() {
        info!(
            "{}-back totals: {} hits, {} false alarms",
            level, counts.hits, counts.false_alarms
        );
    }
}
