//! Classifier output vocabulary: opaque class code → sensitivity label.

use super::SensitivityLabel;
use crate::error::{AssessError, AssessResult};
use serde::Deserialize;
use std::path::Path;

/// On-disk form of a fitted label encoder: code `i` decodes to `classes[i]`.
#[derive(Debug, Deserialize)]
struct LabelEncoderFile {
    classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDecoder {
    classes: Vec<SensitivityLabel>,
}

impl Default for LabelDecoder {
    /// Lexicographically sorted classes, as a label encoder fitted on the label names produces.
    fn default() -> Self {
        Self {
            classes: vec![
                SensitivityLabel::Confidential,
                SensitivityLabel::HighlySensitive,
                SensitivityLabel::Internal,
                SensitivityLabel::Public,
            ],
        }
    }
}

impl LabelDecoder {
    pub fn new(classes: Vec<SensitivityLabel>) -> AssessResult<Self> {
        if classes.is_empty() {
            return Err(AssessError::Configuration(
                "label vocabulary is empty".to_string(),
            ));
        }
        for (i, label) in classes.iter().enumerate() {
            if classes[..i].contains(label) {
                return Err(AssessError::Configuration(format!(
                    "label vocabulary lists {} twice",
                    label
                )));
            }
        }
        Ok(Self { classes })
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> AssessResult<Self> {
        let classes = names
            .iter()
            .map(|n| {
                n.as_ref().parse::<SensitivityLabel>().map_err(|_| {
                    AssessError::Configuration(format!(
                        "label vocabulary contains unknown label {:?}",
                        n.as_ref()
                    ))
                })
            })
            .collect::<AssessResult<Vec<_>>>()?;
        Self::new(classes)
    }

    pub fn load(path: &Path) -> AssessResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            AssessError::Configuration(format!(
                "label encoder {} unreadable: {}",
                path.display(),
                e
            ))
        })?;
        let file: LabelEncoderFile = serde_json::from_str(&data).map_err(|e| {
            AssessError::Configuration(format!("label encoder {} invalid: {}", path.display(), e))
        })?;
        Self::from_names(&file.classes)
    }

    pub fn decode(&self, code: i64) -> AssessResult<SensitivityLabel> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .copied()
            .ok_or_else(|| {
                AssessError::ModelInference(format!(
                    "classifier returned code {} outside vocabulary of {}",
                    code,
                    self.classes.len()
                ))
            })
    }

    pub fn classes(&self) -> &[SensitivityLabel] {
        &self.classes
    }
}
