pub mod config;
pub mod error;
pub mod result;
pub mod run;
pub mod scoring;
pub mod sequence;
pub mod session;
pub mod trial;

pub use config::SessionConfig;
pub use error::{ConfigError, GenerationError, HostAbort, RunError, ScoringError, SessionError};
pub use result::{RunResult, SessionSummary, Tally, TrialRecord};
pub use run::{PresentationDriver, RunController, RunSettings};
pub use scoring::{LevelCounts, ResponseScorer, ScoreCounters};
pub use sequence::{RunSequence, SequenceGenerator};
pub use session::SessionOrchestrator;
pub use trial::{Trial, TrialTimestamps};
