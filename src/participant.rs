// participant.rs

use nback_core::{KeyResponse, MatchKey, StimulusId};
use nback_experiment::{HostAbort, PresentationDriver};
use nback_timing::Timer;
use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;

/// Fastest simulated reaction.
const MIN_LATENCY: Duration = Duration::from_millis(150);

/// Headless stand-in for a participant.
///
/// Remembers the last n stimuli of the current run and presses the match key
/// with `hit_rate` on a real match and `false_alarm_rate` otherwise. Each
/// presentation blocks on the timer for the whole window, like a display
/// would.
pub struct SimulatedParticipant<R: Rng, T: Timer> {
    pub rng: R,
    pub timer: T,
    pub key: MatchKey,
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
    n: usize,
    history: VecDeque<StimulusId>,
}

impl<R: Rng, T: Timer> SimulatedParticipant<R, T> {
    pub fn new(rng: R, timer: T, key: MatchKey, hit_rate: f64, false_alarm_rate: f64) -> Self {
        Self {
            rng,
            timer,
            key,
            hit_rate: hit_rate.clamp(0.0, 1.0),
            false_alarm_rate: false_alarm_rate.clamp(0.0, 1.0),
            n: 0,
            history: VecDeque::new(),
        }
    }

    fn is_match(&self, stimulus: &StimulusId) -> bool {
        self.n > 0 && self.history.len() == self.n && self.history.front() == Some(stimulus)
    }

    fn remember(&mut self, stimulus: &StimulusId) {
        self.history.push_back(stimulus.clone());
        while self.history.len() > self.n {
            self.history.pop_front();
        }
    }
}

impl<R: Rng, T: Timer> PresentationDriver for SimulatedParticipant<R, T> {
    fn present(
        &mut self,
        stimulus: &StimulusId,
        window: Duration,
    ) -> Result<Option<KeyResponse>, HostAbort> {
        let p = if self.is_match(stimulus) {
            self.hit_rate
        } else {
            self.false_alarm_rate
        };
        self.remember(stimulus);

        let response = if self.rng.random_bool(p) {
            let latency = if window > MIN_LATENCY {
                self.rng.random_range(MIN_LATENCY..=window)
            } else {
                window
            };
            Some(KeyResponse {
                key: self.key.clone(),
                latency,
            })
        } else {
            None
        };

        self.timer.sleep(window);
        Ok(response)
    }

    fn begin_run(&mut self, _run_index: usize, n_level: u32) {
        self.n = n_level as usize;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nback_timing::VirtualTimer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn participant(hit_rate: f64, false_alarm_rate: f64) -> SimulatedParticipant<StdRng, VirtualTimer> {
        SimulatedParticipant::new(
            StdRng::seed_from_u64(3),
            VirtualTimer::new(),
            MatchKey::default(),
            hit_rate,
            false_alarm_rate,
        )
    }

    #[test]
    fn perfect_participant_answers_only_matches() {
        let window = Duration::from_millis(2500);
        let mut p = participant(1.0, 0.0);
        p.begin_run(0, 2);

        let stream = ["B", "C", "B", "D", "B"];
        let answers: Vec<bool> = stream
            .iter()
            .map(|s| {
                p.present(&StimulusId::new(s), window)
                    .unwrap()
                    .is_some()
            })
            .collect();
        assert_eq!(answers, vec![false, false, true, false, true]);
        assert_eq!(p.timer.now(), 5 * window.as_nanos() as u64);
    }

    #[test]
    fn latency_stays_inside_the_window() {
        let window = Duration::from_millis(500);
        let mut p = participant(1.0, 1.0);
        p.begin_run(0, 1);
        for _ in 0..50 {
            let response = p.present(&StimulusId::new("B"), window).unwrap().unwrap();
            assert!(response.latency >= MIN_LATENCY && response.latency <= window);
        }
    }

    #[test]
    fn new_run_forgets_previous_stimuli() {
        let window = Duration::from_millis(100);
        let mut p = participant(1.0, 0.0);
        p.begin_run(0, 1);
        p.present(&StimulusId::new("B"), window).unwrap();
        p.begin_run(1, 1);
        assert!(p.present(&StimulusId::new("B"), window).unwrap().is_none());
    }
}
