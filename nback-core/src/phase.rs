/// Per-run state machine.
///
/// `NotStarted -> Presenting(i) -> Awaiting(i) -> Scored(i)` for each trial
/// `i`, then `Finished` once `i + 1` equals the run length.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Presenting(usize),
    Awaiting(usize),
    Scored(usize),
    Finished,
}

impl RunPhase {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Awaiting(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Index of the trial in flight, if any
    pub fn trial_index(&self) -> Option<usize> {
        match self {
            Self::Presenting(i) | Self::Awaiting(i) | Self::Scored(i) => Some(*i),
            Self::NotStarted | Self::Finished => None,
        }
    }

    /// Successor phase for a run of `len` trials; `None` once finished.
    pub fn next(&self, len: usize) -> Option<Self> {
        use RunPhase::*;
        Some(match *self {
            NotStarted if len == 0 => Finished,
            NotStarted => Presenting(0),
            Presenting(i) => Awaiting(i),
            Awaiting(i) => Scored(i),
            Scored(i) if i + 1 >= len => Finished,
            Scored(i) => Presenting(i + 1),
            Finished => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_every_trial_in_order() {
        let mut phase = RunPhase::default();
        let mut seen = Vec::new();
        while let Some(next) = phase.next(2) {
            seen.push(next);
            phase = next;
        }
        assert_eq!(
            seen,
            vec![
                RunPhase::Presenting(0),
                RunPhase::Awaiting(0),
                RunPhase::Scored(0),
                RunPhase::Presenting(1),
                RunPhase::Awaiting(1),
                RunPhase::Scored(1),
                RunPhase::Finished,
            ]
        );
    }

    #[test]
    fn empty_run_finishes_immediately() {
        assert_eq!(RunPhase::NotStarted.next(0), Some(RunPhase::Finished));
        assert_eq!(RunPhase::Finished.next(0), None);
    }

    #[test]
    fn only_awaiting_accepts_input() {
        assert!(RunPhase::Awaiting(3).allows_input());
        assert!(!RunPhase::Presenting(3).allows_input());
        assert!(!RunPhase::Finished.allows_input());
        assert_eq!(RunPhase::Scored(4).trial_index(), Some(4));
    }
}
