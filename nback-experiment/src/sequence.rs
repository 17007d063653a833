//! Stimulus sequence generation for a single run.
//!
//! A run at level `n` opens with `n` lead positions followed by a shuffled mix
//! of targets and non-targets. Targets repeat the stimulus `n` positions back;
//! non-targets are drawn from the pool minus that stimulus.
//!
//! Lead stimuli are drawn with replacement and without any constraint. Only
//! positions labelled `NonTarget` are guarded against an accidental n-back
//! match, so a lead draw may coincidentally line up with (or break) a relation
//! the role labels do not describe. That behavior is inherited from the
//! classic task layout and is kept as is.

use crate::error::GenerationError;
use nback_core::{StimulusId, StimulusPool, TrialRole, TrialSpec};
use rand::Rng;
use rand::seq::{IndexedRandom, IteratorRandom, SliceRandom};
use tracing::debug;

/// Ordered trials of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSequence {
    n_level: u32,
    trials: Vec<TrialSpec>,
}

impl RunSequence {
    pub fn n_level(&self) -> u32 {
        self.n_level
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrialSpec> {
        self.trials.get(index)
    }

    pub fn trials(&self) -> &[TrialSpec] {
        &self.trials
    }

    pub fn count(&self, role: TrialRole) -> usize {
        self.trials.iter().filter(|t| t.role == role).count()
    }

    pub fn into_trials(self) -> Vec<TrialSpec> {
        self.trials
    }
}

pub struct SequenceGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> SequenceGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// `n` leads followed by the shuffled scored roles.
    pub fn role_schedule(
        &mut self,
        n: u32,
        target_count: usize,
        non_target_count: usize,
    ) -> Vec<TrialRole> {
        let mut scored: Vec<TrialRole> = std::iter::repeat_n(TrialRole::Target, target_count)
            .chain(std::iter::repeat_n(TrialRole::NonTarget, non_target_count))
            .collect();
        scored.shuffle(&mut self.rng);

        let mut roles = Vec::with_capacity(n as usize + scored.len());
        roles.extend(std::iter::repeat_n(TrialRole::Lead, n as usize));
        roles.extend(scored);
        roles
    }

    pub fn generate(
        &mut self,
        n: u32,
        target_count: usize,
        non_target_count: usize,
        pool: &StimulusPool,
    ) -> Result<RunSequence, GenerationError> {
        if n == 0 {
            return Err(GenerationError::ZeroLevel);
        }
        let roles = self.role_schedule(n, target_count, non_target_count);
        let back = n as usize;
        let mut stimuli: Vec<StimulusId> = Vec::with_capacity(roles.len());

        for (position, role) in roles.iter().enumerate() {
            let stimulus = match role {
                TrialRole::Lead => pool
                    .as_slice()
                    .choose(&mut self.rng)
                    .cloned()
                    .ok_or_else(|| GenerationError::PoolExhausted {
                        position,
                        excluded: String::new(),
                    })?,
                TrialRole::Target => stimuli[position - back].clone(),
                TrialRole::NonTarget => {
                    let excluded = &stimuli[position - back];
                    pool.without(excluded)
                        .choose(&mut self.rng)
                        .cloned()
                        .ok_or_else(|| GenerationError::PoolExhausted {
                            position,
                            excluded: excluded.to_string(),
                        })?
                }
            };
            stimuli.push(stimulus);
        }

        let trials: Vec<TrialSpec> = roles
            .into_iter()
            .zip(stimuli)
            .enumerate()
            .map(|(position, (role, stimulus))| TrialSpec {
                position,
                role,
                stimulus,
                n_level: n,
            })
            .collect();

        debug!(
            n,
            target_count,
            non_target_count,
            len = trials.len(),
            "generated run sequence"
        );
        Ok(RunSequence { n_level: n, trials })
    }
}
