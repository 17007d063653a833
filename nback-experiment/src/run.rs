use super::error::{HostAbort, RunError};
use super::result::RunResult;
use super::scoring::ResponseScorer;
use super::sequence::RunSequence;
use super::trial::Trial;
use nback_core::{
    Classification, KeyResponse, MatchKey, ResponseEvent, RunPhase, StimulusId, TrialSpec,
};
use nback_timing::{Timer, WindowStats};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Host side of a run: shows a stimulus, waits out the window and reports the
/// key press it saw, if any.
///
/// `present` is expected to block for `window`. If it returns early the
/// controller sleeps for the rest of the window on its own timer.
pub trait PresentationDriver {
    fn present(
        &mut self,
        stimulus: &StimulusId,
        window: Duration,
    ) -> Result<Option<KeyResponse>, HostAbort>;

    /// Called before the first trial of each run.
    fn begin_run(&mut self, _run_index: usize, _n_level: u32) {}

    /// Rest checkpoint between two runs.
    fn rest(&mut self, _completed_run: usize) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub window: Duration,
    pub match_key: MatchKey,
}

/// Drives one run through `NotStarted -> Presenting -> Awaiting -> Scored`
/// for every trial, then `Finished`.
pub struct RunController<T: Timer> {
    pub sequence: RunSequence,
    pub settings: RunSettings,
    pub timer: T,
    phase: RunPhase,
    current: Option<Trial<T::Timestamp>>,
    events: Vec<ResponseEvent>,
    classifications: Vec<Classification>,
    windows: Vec<Duration>,
}

impl<T: Timer> RunController<T> {
    pub fn new(sequence: RunSequence, settings: RunSettings, timer: T) -> Self {
        let len = sequence.len();
        Self {
            sequence,
            settings,
            timer,
            phase: RunPhase::NotStarted,
            current: None,
            events: Vec::with_capacity(len),
            classifications: Vec::with_capacity(len),
            windows: Vec::with_capacity(len),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn current_trial(&self) -> Option<&TrialSpec> {
        self.phase
            .trial_index()
            .and_then(|index| self.sequence.get(index))
    }

    /// Trials that made it through scoring so far
    pub fn completed(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[ResponseEvent] {
        &self.events
    }

    /// Moves to the next phase and performs its work.
    pub fn step<D: PresentationDriver>(
        &mut self,
        driver: &mut D,
        scorer: &mut ResponseScorer,
    ) -> Result<RunPhase, RunError> {
        let next = self
            .phase
            .next(self.sequence.len())
            .ok_or(RunError::AlreadyFinished)?;

        match next {
            RunPhase::NotStarted => unreachable!("no phase leads back to NotStarted"),
            RunPhase::Presenting(index) => {
                self.current = Some(Trial::new(index));
                debug!(trial = index, "presenting");
            }
            RunPhase::Awaiting(index) => self.await_response(index, driver)?,
            RunPhase::Scored(index) => self.score_trial(index, scorer)?,
            RunPhase::Finished => self.log_finish(),
        }

        self.phase = next;
        Ok(next)
    }

    /// Steps until `Finished` and hands back the run's result.
    pub fn run_to_end<D: PresentationDriver>(
        mut self,
        driver: &mut D,
        scorer: &mut ResponseScorer,
    ) -> Result<RunResult, RunError> {
        while !self.phase.is_finished() {
            self.step(driver, scorer)?;
        }
        self.into_result().ok_or(RunError::AlreadyFinished)
    }

    /// The run's result, only once it has finished.
    pub fn into_result(self) -> Option<RunResult> {
        if !self.phase.is_finished() {
            return None;
        }
        Some(RunResult {
            n_level: self.sequence.n_level(),
            trials: self.sequence.into_trials(),
            events: self.events,
            classifications: self.classifications,
        })
    }

    fn await_response<D: PresentationDriver>(
        &mut self,
        index: usize,
        driver: &mut D,
    ) -> Result<(), RunError> {
        let window = self.settings.window;
        let Some(spec) = self.sequence.get(index) else {
            unreachable!("phase index {index} is bounded by the sequence length");
        };

        let onset = self.timer.now();
        let response = driver
            .present(&spec.stimulus, window)
            .map_err(|HostAbort| RunError::Aborted {
                completed: self.events.len(),
            })?;

        let reaction_time = match response {
            Some(KeyResponse { key, latency }) if key == self.settings.match_key => {
                if latency <= window {
                    debug!(
                        trial = index,
                        rt_ms = latency.as_secs_f64() * 1e3,
                        "response recorded"
                    );
                    Some(latency)
                } else {
                    warn!(
                        trial = index,
                        latency_ms = latency.as_secs_f64() * 1e3,
                        window_ms = window.as_secs_f64() * 1e3,
                        "response after window closed, ignored"
                    );
                    None
                }
            }
            Some(KeyResponse { key, .. }) => {
                debug!(trial = index, %key, "non-match key ignored");
                None
            }
            None => None,
        };

        // An early response never shortens the window.
        let elapsed = self.timer.elapsed(onset);
        if elapsed < window {
            self.timer.sleep(window - elapsed);
        }
        let window_elapsed = self.timer.elapsed(onset);
        self.windows.push(window_elapsed);

        if let Some(trial) = self.current.as_mut() {
            trial.timestamps.onset = Some(onset);
            trial.timestamps.window_elapsed = Some(window_elapsed);
            trial.reaction_time = reaction_time;
        }
        Ok(())
    }

    fn score_trial(&mut self, index: usize, scorer: &mut ResponseScorer) -> Result<(), RunError> {
        let Some(spec) = self.sequence.get(index) else {
            unreachable!("phase index {index} is bounded by the sequence length");
        };
        let event = match self.current.take() {
            Some(Trial {
                reaction_time: Some(rt),
                ..
            }) => ResponseEvent::pressed(index, rt),
            _ => ResponseEvent::no_response(index),
        };
        let classification = scorer.score(spec, &event)?;
        debug!(trial = index, role = ?spec.role, ?classification, "scored");

        self.events.push(event);
        self.classifications.push(classification);
        Ok(())
    }

    fn log_finish(&self) {
        let stats = WindowStats::from_samples(&self.windows);
        info!(
            n = self.sequence.n_level(),
            trials = self.events.len(),
            window_mean_ms = stats.average_ns / 1e6,
            window_jitter_ms = stats.jitter_ns / 1e6,
            window_max_ms = stats.max_ns / 1e6,
            "run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequenceGenerator;
    use nback_core::{StimulusPool, TrialRole};
    use nback_timing::VirtualTimer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    const WINDOW: Duration = Duration::from_millis(2500);

    /// Replies from a fixed script keyed by presentation count and sleeps on a
    /// shared virtual clock for `sleep_for` of each window.
    struct ScriptedDriver {
        timer: VirtualTimer,
        script: HashMap<usize, KeyResponse>,
        sleep_for: Duration,
        abort_at: Option<usize>,
        presented: Vec<StimulusId>,
    }

    impl ScriptedDriver {
        fn new(timer: VirtualTimer) -> Self {
            Self {
                timer,
                script: HashMap::new(),
                sleep_for: WINDOW,
                abort_at: None,
                presented: Vec::new(),
            }
        }

        fn press(mut self, trial: usize, key: &str, latency: Duration) -> Self {
            self.script.insert(
                trial,
                KeyResponse {
                    key: MatchKey::new(key),
                    latency,
                },
            );
            self
        }
    }

    impl PresentationDriver for ScriptedDriver {
        fn present(
            &mut self,
            stimulus: &StimulusId,
            _window: Duration,
        ) -> Result<Option<KeyResponse>, HostAbort> {
            let index = self.presented.len();
            if self.abort_at == Some(index) {
                return Err(HostAbort);
            }
            self.presented.push(stimulus.clone());
            self.timer.sleep(self.sleep_for);
            Ok(self.script.get(&index).cloned())
        }
    }

    fn sequence(n: u32, targets: usize, non_targets: usize) -> RunSequence {
        let pool = StimulusPool::new(["B", "C", "D", "F", "H", "K", "N", "Q"]).unwrap();
        SequenceGenerator::new(StdRng::seed_from_u64(11))
            .generate(n, targets, non_targets, &pool)
            .unwrap()
    }

    fn controller(seq: RunSequence, timer: VirtualTimer) -> RunController<VirtualTimer> {
        RunController::new(
            seq,
            RunSettings {
                window: WINDOW,
                match_key: MatchKey::default(),
            },
            timer,
        )
    }

    fn first(seq: &RunSequence, role: TrialRole) -> usize {
        seq.trials().iter().position(|t| t.role == role).unwrap()
    }

    #[test]
    fn presents_every_trial_in_order() {
        let seq = sequence(2, 2, 3);
        let expected: Vec<StimulusId> = seq.trials().iter().map(|t| t.stimulus.clone()).collect();
        let timer = VirtualTimer::new();
        let mut driver = ScriptedDriver::new(timer.clone());
        let mut scorer = ResponseScorer::new();

        let result = controller(seq, timer.clone())
            .run_to_end(&mut driver, &mut scorer)
            .unwrap();

        assert_eq!(driver.presented, expected);
        assert_eq!(result.len(), 7);
        assert!(result.events.iter().enumerate().all(|(i, e)| e.trial_index == i));
        assert_eq!(timer.now(), 7 * WINDOW.as_nanos() as u64);
    }

    #[test]
    fn boundary_and_zero_latency_responses_count() {
        let seq = sequence(1, 4, 4);
        let target = first(&seq, TrialRole::Target);
        let non_target = first(&seq, TrialRole::NonTarget);
        let timer = VirtualTimer::new();
        let mut driver = ScriptedDriver::new(timer.clone())
            .press(target, "space", WINDOW)
            .press(non_target, "space", Duration::ZERO);
        let mut scorer = ResponseScorer::new();

        let result = controller(seq, timer)
            .run_to_end(&mut driver, &mut scorer)
            .unwrap();

        assert_eq!(result.classifications[target], Classification::Hit);
        assert_eq!(result.events[target].reaction_time, Some(WINDOW));
        assert_eq!(result.classifications[non_target], Classification::FalseAlarm);
        assert_eq!(result.events[non_target].reaction_time, Some(Duration::ZERO));
        assert_eq!(scorer.counters().hits(1), 1);
        assert_eq!(scorer.counters().false_alarms(1), 1);
    }

    #[test]
    fn late_and_wrong_key_responses_are_ignored() {
        let seq = sequence(1, 4, 0);
        let timer = VirtualTimer::new();
        let mut driver = ScriptedDriver::new(timer.clone())
            .press(1, "space", WINDOW + Duration::from_nanos(1))
            .press(2, "enter", Duration::from_millis(300));
        let mut scorer = ResponseScorer::new();

        let result = controller(seq, timer)
            .run_to_end(&mut driver, &mut scorer)
            .unwrap();

        assert_eq!(result.classifications[1], Classification::Miss);
        assert_eq!(result.classifications[2], Classification::Miss);
        assert!(!result.events[1].pressed);
        assert_eq!(scorer.counters().hits(1), 0);
    }

    #[test]
    fn early_driver_return_still_consumes_full_window() {
        let seq = sequence(1, 1, 1);
        let timer = VirtualTimer::new();
        let mut driver = ScriptedDriver::new(timer.clone())
            .press(1, "space", Duration::from_millis(200));
        driver.sleep_for = Duration::from_millis(200);
        let mut scorer = ResponseScorer::new();

        controller(seq, timer.clone())
            .run_to_end(&mut driver, &mut scorer)
            .unwrap();

        assert_eq!(timer.now(), 3 * WINDOW.as_nanos() as u64);
    }

    #[test]
    fn stepping_walks_the_phase_machine() {
        let seq = sequence(1, 0, 1);
        let timer = VirtualTimer::new();
        let mut driver = ScriptedDriver::new(timer.clone());
        let mut scorer = ResponseScorer::new();
        let mut run = controller(seq, timer);

        assert_eq!(run.phase(), RunPhase::NotStarted);
        assert_eq!(run.step(&mut driver, &mut scorer), Ok(RunPhase::Presenting(0)));
        assert_eq!(run.current_trial().map(|t| t.role), Some(TrialRole::Lead));
        assert_eq!(run.step(&mut driver, &mut scorer), Ok(RunPhase::Awaiting(0)));
        assert_eq!(run.completed(), 0);
        assert_eq!(run.step(&mut driver, &mut scorer), Ok(RunPhase::Scored(0)));
        assert_eq!(run.completed(), 1);
        for _ in 0..3 {
            run.step(&mut driver, &mut scorer).unwrap();
        }
        assert_eq!(run.step(&mut driver, &mut scorer), Ok(RunPhase::Finished));
        assert_eq!(
            run.step(&mut driver, &mut scorer),
            Err(RunError::AlreadyFinished)
        );
        assert!(run.into_result().is_some());
    }

    #[test]
    fn unfinished_run_has_no_result() {
        let timer = VirtualTimer::new();
        let mut driver = ScriptedDriver::new(timer.clone());
        let mut scorer = ResponseScorer::new();
        let mut run = controller(sequence(1, 1, 1), timer);
        run.step(&mut driver, &mut scorer).unwrap();
        assert!(run.into_result().is_none());
    }

    #[test]
    fn host_abort_stops_the_run() {
        let seq = sequence(2, 2, 2);
        let timer = VirtualTimer::new();
        let mut driver = ScriptedDriver::new(timer.clone());
        driver.abort_at = Some(3);
        let mut scorer = ResponseScorer::new();

        let err = controller(seq, timer)
            .run_to_end(&mut driver, &mut scorer)
            .unwrap_err();

        assert_eq!(err, RunError::Aborted { completed: 3 });
        assert_eq!(scorer.scored_count(), 3);
    }
}
