use std::time::Duration;

/// Trial currently in flight inside a run controller
#[derive(Debug, Clone)]
pub struct Trial<T> {
    pub index: usize,
    pub timestamps: TrialTimestamps<T>,
    /// Accepted reaction time, if the match key was pressed inside the window.
    pub reaction_time: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct TrialTimestamps<T> {
    pub onset: Option<T>,
    /// Time the window actually took, padding included.
    pub window_elapsed: Option<Duration>,
}

impl<T> Trial<T> {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            timestamps: TrialTimestamps {
                onset: None,
                window_elapsed: None,
            },
            reaction_time: None,
        }
    }

    pub fn responded(&self) -> bool {
        self.reaction_time.is_some()
    }
}
