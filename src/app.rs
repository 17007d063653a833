// app.rs

use crate::args::Args;
use crate::participant::SimulatedParticipant;
use crate::report::{log_summary, Report};
use anyhow::{Context, Result};
use nback_core::StimulusPool;
use nback_experiment::{SessionConfig, SessionError, SessionOrchestrator, SessionSummary};
use nback_timing::{HighPrecisionTimer, Timer, VirtualTimer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

pub struct App {
    args: Args,
    config: SessionConfig,
    pool: StimulusPool,
    seed: u64,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        args.check_rates()?;
        let config = args.session_config()?;
        let pool = args
            .stimuli
            .pool()
            .context("Failed to build stimulus pool")?;
        let seed = args.seed.unwrap_or_else(rand::random);

        Ok(Self {
            args,
            config,
            pool,
            seed,
        })
    }

    pub fn run(self) -> Result<()> {
        info!("=== N-BACK SESSION ===");
        info!(
            "Platform: {} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        info!(
            "Seed {}, {} runs {:?}, {} targets + {} non-targets, {} ms windows",
            self.seed,
            self.config.levels.len(),
            self.config.levels,
            self.config.target_count,
            self.config.non_target_count,
            self.config.presentation_ms,
        );

        let summary = if self.args.realtime {
            self.run_session(HighPrecisionTimer::new())?
        } else {
            self.run_session(VirtualTimer::new())?
        };

        log_summary(&summary);
        Report::new(self.seed, self.args.stimuli, &self.config, &summary).write(&self.args.output)?;
        Ok(())
    }

    fn run_session<T: Timer>(&self, timer: T) -> Result<SessionSummary> {
        let mut orchestrator = SessionOrchestrator::new(
            self.config.clone(),
            self.pool.clone(),
            StdRng::seed_from_u64(self.seed),
            timer.clone(),
        )?;
        // separate stream so participant behaviour does not shift the sequences
        let mut participant = SimulatedParticipant::new(
            StdRng::seed_from_u64(self.seed.wrapping_add(1)),
            timer,
            self.config.match_key.clone(),
            self.args.hit_rate,
            self.args.false_alarm_rate,
        );

        match orchestrator.run(&mut participant) {
            Ok(summary) => Ok(summary),
            Err(SessionError::Aborted { run, partial }) => {
                warn!(
                    "Session aborted during run {}; keeping {} completed runs",
                    run + 1,
                    partial.runs.len()
                );
                Ok(*partial)
            }
            Err(e) => Err(e.into()),
        }
    }
}
