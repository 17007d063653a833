use crate::result::SessionSummary;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("session has no runs")]
    NoRuns,
    #[error("run {run} has n-level 0; levels must be at least 1")]
    ZeroLevel { run: usize },
    #[error("presentation duration must be positive")]
    ZeroPresentation,
    #[error("stimulus pool too small: need at least {required}, have {available}")]
    PoolTooSmall { required: usize, available: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("n-level must be at least 1")]
    ZeroLevel,
    #[error("no stimulus left for non-target at position {position} after excluding {excluded}")]
    PoolExhausted { position: usize, excluded: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("trial {trial} was already scored")]
    AlreadyScored { trial: usize },
    #[error("response for trial {event} does not belong to trial {trial}")]
    TrialMismatch { trial: usize, event: usize },
}

/// Raised by a presentation driver when the host stops the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("presentation aborted by host")]
pub struct HostAbort;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("run aborted after {completed} completed trials")]
    Aborted { completed: usize },
    #[error("run already finished")]
    AlreadyFinished,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("sequence generation failed for run {run}: {source}")]
    Generation {
        run: usize,
        #[source]
        source: GenerationError,
    },
    #[error("run {run} failed: {source}")]
    Run {
        run: usize,
        #[source]
        source: RunError,
    },
    /// Completed runs stay valid; the interrupted run is dropped whole.
    #[error("session aborted during run {run}")]
    Aborted {
        run: usize,
        partial: Box<SessionSummary>,
    },
}
