//! Behavior feature vector for the anomaly detector.

use super::UserInput;
use serde::{Deserialize, Serialize};

pub const BEHAVIOR_FEATURE_DIM: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorFeatures {
    pub downloads_mb: f64,
    pub uploads_mb: f64,
    pub login_hour: u8,
    pub access_frequency: u64,
}

impl BehaviorFeatures {
    pub fn from_input(input: &UserInput) -> Self {
        Self {
            downloads_mb: input.downloads_mb,
            uploads_mb: input.uploads_mb,
            login_hour: input.login_hour,
            access_frequency: input.access_frequency,
        }
    }

    /// Model input, in training column order.
    pub fn to_vector(&self) -> [f32; BEHAVIOR_FEATURE_DIM] {
        [
            self.downloads_mb as f32,
            self.uploads_mb as f32,
            self.login_hour as f32,
            self.access_frequency as f32,
        ]
    }
}
