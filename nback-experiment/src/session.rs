use crate::config::SessionConfig;
use crate::error::{RunError, SessionError};
use crate::result::SessionSummary;
use crate::run::{PresentationDriver, RunController, RunSettings};
use crate::scoring::ResponseScorer;
use crate::sequence::SequenceGenerator;
use nback_core::StimulusPool;
use nback_timing::Timer;
use rand::Rng;
use tracing::{info, warn};

/// Runs every configured level in order and folds finished runs into a
/// [`SessionSummary`].
///
/// Each run is scored into its own [`ResponseScorer`]; its counters join the
/// session totals only once the run reaches `Finished`, so an aborted run
/// contributes nothing.
pub struct SessionOrchestrator<R: Rng, T: Timer> {
    config: SessionConfig,
    pool: StimulusPool,
    generator: SequenceGenerator<R>,
    timer: T,
}

impl<R: Rng, T: Timer> SessionOrchestrator<R, T> {
    /// Validates the whole configuration up front; nothing runs on failure.
    pub fn new(
        config: SessionConfig,
        pool: StimulusPool,
        rng: R,
        timer: T,
    ) -> Result<Self, SessionError> {
        config.validate(&pool)?;
        Ok(Self {
            config,
            pool,
            generator: SequenceGenerator::new(rng),
            timer,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pool(&self) -> &StimulusPool {
        &self.pool
    }

    pub fn run<D: PresentationDriver>(
        &mut self,
        driver: &mut D,
    ) -> Result<SessionSummary, SessionError> {
        let mut summary = SessionSummary::default();
        let settings = RunSettings {
            window: self.config.presentation(),
            match_key: self.config.match_key.clone(),
        };
        let total = self.config.levels.len();

        info!(
            runs = total,
            levels = ?self.config.levels,
            pool = self.pool.len(),
            "session started"
        );

        for (run_index, &n) in self.config.levels.iter().enumerate() {
            let sequence = self
                .generator
                .generate(
                    n,
                    self.config.target_count,
                    self.config.non_target_count,
                    &self.pool,
                )
                .map_err(|source| SessionError::Generation {
                    run: run_index,
                    source,
                })?;

            info!(run = run_index, n, trials = sequence.len(), "run started");
            driver.begin_run(run_index, n);

            let mut scorer = ResponseScorer::new();
            let controller = RunController::new(sequence, settings.clone(), self.timer.clone());
            let result = match controller.run_to_end(driver, &mut scorer) {
                Ok(result) => result,
                Err(RunError::Aborted { completed }) => {
                    warn!(
                        run = run_index,
                        completed, "run aborted, discarding its partial scores"
                    );
                    return Err(SessionError::Aborted {
                        run: run_index,
                        partial: Box::new(summary),
                    });
                }
                Err(source) => {
                    return Err(SessionError::Run {
                        run: run_index,
                        source,
                    });
                }
            };

            summary.counters.merge(scorer.counters());
            summary.runs.push(result);

            if run_index + 1 < total {
                driver.rest(run_index);
            }
        }

        for (level, counts) in summary.counters.iter() {
            info!(
                n = level,
                hits = counts.hits,
                false_alarms = counts.false_alarms,
                "level totals"
            );
        }
        Ok(summary)
    }
}
