pub mod phase;
pub mod stimulus;
pub mod trial;

pub use phase::RunPhase;
pub use stimulus::{PoolError, StimulusId, StimulusPool};
pub use trial::{Classification, KeyResponse, MatchKey, ResponseEvent, TrialRole, TrialSpec};
