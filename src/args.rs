// args.rs

use crate::stimuli::StimulusSet;
use anyhow::{Context, Result};
use clap::Parser;
use nback_experiment::SessionConfig;
use std::path::PathBuf;

/// Headless n-back session runner with a simulated participant
#[derive(Parser, Debug, Clone)]
#[command(name = "nback")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Session configuration file (JSON); missing fields use the defaults
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Override the n-level of each run, e.g. `1,2,2,3,3`
    #[arg(long, value_delimiter = ',')]
    pub levels: Option<Vec<u32>>,

    /// Override the number of targets per run
    #[arg(long)]
    pub targets: Option<usize>,

    /// Override the number of non-targets per run
    #[arg(long)]
    pub non_targets: Option<usize>,

    /// Override the presentation window in milliseconds
    #[arg(long)]
    pub presentation_ms: Option<u64>,

    /// Seed for sequence generation and the simulated participant
    #[arg(short = 's', long)]
    pub seed: Option<u64>,

    /// Image set the stimulus pool is built from
    #[arg(long, value_enum, default_value_t = StimulusSet::Spatial)]
    pub stimuli: StimulusSet,

    /// Probability of pressing on a true match
    #[arg(long, default_value_t = 0.8)]
    pub hit_rate: f64,

    /// Probability of pressing on anything else
    #[arg(long, default_value_t = 0.1)]
    pub false_alarm_rate: f64,

    /// Wait out every window on the wall clock instead of a virtual one
    #[arg(long)]
    pub realtime: bool,

    /// Where to write the results
    #[arg(short = 'o', long, default_value = "nback_results.json")]
    pub output: PathBuf,

    /// Show per-trial debug output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Args {
    /// Loads the config file, if any, and applies command-line overrides.
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                SessionConfig::from_json_str(&contents)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => SessionConfig::default(),
        };

        if let Some(levels) = &self.levels {
            config.levels = levels.clone();
        }
        if let Some(targets) = self.targets {
            config.target_count = targets;
        }
        if let Some(non_targets) = self.non_targets {
            config.non_target_count = non_targets;
        }
        if let Some(ms) = self.presentation_ms {
            config.presentation_ms = ms;
        }
        Ok(config)
    }

    pub fn check_rates(&self) -> Result<()> {
        for (name, rate) in [
            ("hit-rate", self.hit_rate),
            ("false-alarm-rate", self.false_alarm_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                anyhow::bail!("--{} must be between 0 and 1, got {}", name, rate);
            }
        }
        Ok(())
    }
}
