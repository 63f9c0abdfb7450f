//! Feature assembly: scan result + caller input → model feature vectors.

mod behavioral;
mod input;

pub use behavioral::{BehaviorFeatures, BEHAVIOR_FEATURE_DIM};
pub use input::{RawInput, UserInput};

use crate::scanner::ScanResult;
use serde::{Deserialize, Serialize};

pub const FILE_FEATURE_DIM: usize = 5;

/// Sensitivity classifier input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFeatures {
    pub content_length: u64,
    pub contains_email: bool,
    pub contains_pan: bool,
    pub contains_aadhaar: bool,
    pub file_type_encoded: i64,
}

impl FileFeatures {
    pub fn new(scan: &ScanResult, file_type_encoded: i64) -> Self {
        Self {
            content_length: scan.content_length,
            contains_email: scan.contains_email,
            contains_pan: scan.contains_pan,
            contains_aadhaar: scan.contains_aadhaar,
            file_type_encoded,
        }
    }

    /// Model input, in training column order. Flags encode as 0/1.
    pub fn to_vector(&self) -> [f32; FILE_FEATURE_DIM] {
        [
            self.content_length as f32,
            f32::from(u8::from(self.contains_email)),
            f32::from(u8::from(self.contains_pan)),
            f32::from(u8::from(self.contains_aadhaar)),
            self.file_type_encoded as f32,
        ]
    }
}

/// Both feature vectors for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub file: FileFeatures,
    pub behavior: BehaviorFeatures,
}

/// Stateless; kept as a type so the orchestration reads stage by stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn file_features(scan: &ScanResult, file_type_encoded: i64) -> FileFeatures {
        FileFeatures::new(scan, file_type_encoded)
    }

    pub fn behavior_features(input: &UserInput) -> BehaviorFeatures {
        BehaviorFeatures::from_input(input)
    }

    pub fn assemble(scan: &ScanResult, input: &UserInput) -> FeatureSet {
        FeatureSet {
            file: Self::file_features(scan, input.file_type_encoded),
            behavior: Self::behavior_features(input),
        }
    }
}
