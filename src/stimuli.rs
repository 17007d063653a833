// stimuli.rs

use clap::ValueEnum;
use nback_core::{PoolError, StimulusPool};
use serde::Serialize;

/// Base file names shared by every image set.
pub const BASE_NAMES: [&str; 8] = [
    "B.jpg", "C.jpg", "D.jpg", "F.jpg", "H.jpg", "K.jpg", "N.jpg", "Q.jpg",
];

/// Which image folder the pool is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusSet {
    Letters,
    #[default]
    Spatial,
}

impl StimulusSet {
    pub fn folder(&self) -> &'static str {
        match self {
            StimulusSet::Letters => "letters",
            StimulusSet::Spatial => "spatial",
        }
    }

    pub fn pool(&self) -> Result<StimulusPool, PoolError> {
        StimulusPool::new(
            BASE_NAMES
                .iter()
                .map(|name| format!("{}/{}", self.folder(), name)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools_hold_eight_prefixed_images() {
        let pool = StimulusSet::Letters.pool().unwrap();
        assert_eq!(pool.len(), 8);
        assert_eq!(pool.as_slice()[0].as_str(), "letters/B.jpg");
        assert_eq!(StimulusSet::default().folder(), "spatial");
    }
}
