//! Model interfaces: sensitivity classifier and behavior anomaly detector, plus the
//! adapters that turn raw model codes into domain values.

mod labels;
mod onnx;

pub use labels::LabelDecoder;
pub use onnx::OnnxModel;

use crate::config::ModelConfig;
use crate::error::{AssessError, AssessResult};
use crate::features::{BehaviorFeatures, FileFeatures};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensitivityLabel {
    Public,
    Internal,
    Confidential,
    #[serde(rename = "Highly_Sensitive")]
    HighlySensitive,
}

impl SensitivityLabel {
    pub const ALL: [SensitivityLabel; 4] = [
        SensitivityLabel::Public,
        SensitivityLabel::Internal,
        SensitivityLabel::Confidential,
        SensitivityLabel::HighlySensitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLabel::Public => "Public",
            SensitivityLabel::Internal => "Internal",
            SensitivityLabel::Confidential => "Confidential",
            SensitivityLabel::HighlySensitive => "Highly_Sensitive",
        }
    }
}

impl fmt::Display for SensitivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensitivityLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensitivityLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown sensitivity label {:?}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyFlag {
    Normal,
    Anomalous,
}

/// Detector verdict: the normalized flag plus the model's own code, kept for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReading {
    pub flag: AnomalyFlag,
    pub raw: i64,
}

impl AnomalyReading {
    /// Reading for detectors with no native code; uses the outlier convention (-1 / 1).
    pub fn from_flag(flag: AnomalyFlag) -> Self {
        let raw = match flag {
            AnomalyFlag::Anomalous => -1,
            AnomalyFlag::Normal => 1,
        };
        Self { flag, raw }
    }
}

/// How a binary detector encodes its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyConvention {
    /// Outlier detectors: negative = anomalous, positive = normal
    #[default]
    NegativeIsAnomalous,
    /// Binary classifiers: 1 = anomalous, 0 = normal
    PositiveIsAnomalous,
}

impl AnomalyConvention {
    pub fn normalize(self, raw: i64) -> AssessResult<AnomalyReading> {
        let flag = match (self, raw.signum()) {
            (AnomalyConvention::NegativeIsAnomalous, -1) => AnomalyFlag::Anomalous,
            (AnomalyConvention::NegativeIsAnomalous, 1) => AnomalyFlag::Normal,
            (AnomalyConvention::PositiveIsAnomalous, 1) => AnomalyFlag::Anomalous,
            (AnomalyConvention::PositiveIsAnomalous, 0) => AnomalyFlag::Normal,
            _ => {
                return Err(AssessError::ModelInference(format!(
                    "anomaly code {} is not valid under {:?}",
                    raw, self
                )))
            }
        };
        Ok(AnomalyReading { flag, raw })
    }
}

/// A loaded estimator that predicts one integer code per feature row.
pub trait RawModel: Send + Sync {
    fn predict(&self, input: &[f32]) -> AssessResult<i64>;
}

/// File features → sensitivity label. Shared read-only across concurrent assessments.
pub trait SensitivityClassifier: Send + Sync {
    fn classify(&self, features: &FileFeatures) -> AssessResult<SensitivityLabel>;

    /// Every label `classify` can return.
    fn vocabulary(&self) -> Vec<SensitivityLabel> {
        SensitivityLabel::ALL.to_vec()
    }
}

/// Behavior features → normal/anomalous. Shared read-only across concurrent assessments.
pub trait AnomalyDetector: Send + Sync {
    fn score(&self, features: &BehaviorFeatures) -> AssessResult<AnomalyReading>;
}

/// Runs a raw classifier and decodes its class code through the label vocabulary.
pub struct ClassifierAdapter<M> {
    model: M,
    decoder: LabelDecoder,
}

impl<M: RawModel> ClassifierAdapter<M> {
    pub fn new(model: M, decoder: LabelDecoder) -> Self {
        Self { model, decoder }
    }
}

impl<M: RawModel> SensitivityClassifier for ClassifierAdapter<M> {
    fn classify(&self, features: &FileFeatures) -> AssessResult<SensitivityLabel> {
        let code = self.model.predict(&features.to_vector())?;
        self.decoder.decode(code)
    }

    fn vocabulary(&self) -> Vec<SensitivityLabel> {
        self.decoder.classes().to_vec()
    }
}

/// Runs a raw detector and normalizes its binary code.
pub struct AnomalyAdapter<M> {
    model: M,
    convention: AnomalyConvention,
}

impl<M: RawModel> AnomalyAdapter<M> {
    pub fn new(model: M, convention: AnomalyConvention) -> Self {
        Self { model, convention }
    }
}

impl<M: RawModel> AnomalyDetector for AnomalyAdapter<M> {
    fn score(&self, features: &BehaviorFeatures) -> AssessResult<AnomalyReading> {
        let raw = self.model.predict(&features.to_vector())?;
        self.convention.normalize(raw)
    }
}

/// The two models, loaded once and passed explicitly to the assessor.
#[derive(Clone)]
pub struct ModelBundle {
    classifier: Arc<dyn SensitivityClassifier>,
    detector: Arc<dyn AnomalyDetector>,
}

impl ModelBundle {
    pub fn new(
        classifier: impl SensitivityClassifier + 'static,
        detector: impl AnomalyDetector + 'static,
    ) -> Self {
        Self {
            classifier: Arc::new(classifier),
            detector: Arc::new(detector),
        }
    }

    pub fn from_shared(
        classifier: Arc<dyn SensitivityClassifier>,
        detector: Arc<dyn AnomalyDetector>,
    ) -> Self {
        Self {
            classifier,
            detector,
        }
    }

    /// Load the ONNX classifier, its label vocabulary and the ONNX anomaly detector.
    pub fn load(config: &ModelConfig) -> AssessResult<Self> {
        let decoder = LabelDecoder::load(&config.label_encoder_path())?;
        let classifier = OnnxModel::load(&config.classifier_path())?;
        let detector = OnnxModel::load(&config.anomaly_path())?;
        Ok(Self::new(
            ClassifierAdapter::new(classifier, decoder),
            AnomalyAdapter::new(detector, config.anomaly_convention),
        ))
    }

    pub fn classifier(&self) -> &dyn SensitivityClassifier {
        self.classifier.as_ref()
    }

    pub fn detector(&self) -> &dyn AnomalyDetector {
        self.detector.as_ref()
    }
}
