//! Engine configuration. Loaded once at startup; immutable afterwards.

use crate::error::{AssessError, AssessResult};
use crate::model::{AnomalyConvention, SensitivityLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Location and conventions of the pre-trained model artifacts
    pub model: ModelConfig,
    /// Risk fusion tables and tier thresholds
    pub risk: RiskConfig,
    /// Decision audit log sink
    pub audit: AuditConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    /// Sensitivity classifier (ONNX)
    pub classifier_file: String,
    /// Label vocabulary for decoding classifier output codes
    pub label_encoder_file: String,
    /// Behavior anomaly detector (ONNX)
    pub anomaly_file: String,
    /// How the anomaly detector encodes its verdict
    pub anomaly_convention: AnomalyConvention,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Base risk per sensitivity label
    pub base_risk_table: BTreeMap<SensitivityLabel, u32>,
    /// Added when behavior is anomalous
    pub behavior_risk_increment: u32,
    pub tier_thresholds: TierThresholds,
}

/// Lower bounds (inclusive) of the upper two decision tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub high: u32,
    pub medium: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditFormat {
    /// One comma-separated line per assessment
    #[default]
    Csv,
    /// One JSON object per line
    Ndjson,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub path: PathBuf,
    pub format: AuditFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
            classifier_file: "leakage_model.onnx".to_string(),
            label_encoder_file: "label_encoder.json".to_string(),
            anomaly_file: "anomaly_model.onnx".to_string(),
            anomaly_convention: AnomalyConvention::default(),
        }
    }
}

impl ModelConfig {
    pub fn classifier_path(&self) -> PathBuf {
        self.model_dir.join(&self.classifier_file)
    }

    pub fn label_encoder_path(&self) -> PathBuf {
        self.model_dir.join(&self.label_encoder_file)
    }

    pub fn anomaly_path(&self) -> PathBuf {
        self.model_dir.join(&self.anomaly_file)
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        let base_risk_table = BTreeMap::from([
            (SensitivityLabel::Public, 0),
            (SensitivityLabel::Internal, 2),
            (SensitivityLabel::Confidential, 4),
            (SensitivityLabel::HighlySensitive, 6),
        ]);
        Self {
            base_risk_table,
            behavior_risk_increment: 5,
            tier_thresholds: TierThresholds::default(),
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self { high: 8, medium: 4 }
    }
}

impl RiskConfig {
    /// Every label the classifier can emit must have a base risk, and tiers must be ordered.
    pub fn validate(&self, vocabulary: &[SensitivityLabel]) -> AssessResult<()> {
        let missing: Vec<&str> = vocabulary
            .iter()
            .filter(|label| !self.base_risk_table.contains_key(*label))
            .map(|label| label.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(AssessError::Configuration(format!(
                "base_risk_table has no entry for label(s): {}",
                missing.join(", ")
            )));
        }
        if self.tier_thresholds.medium > self.tier_thresholds.high {
            return Err(AssessError::Configuration(format!(
                "tier_thresholds.medium ({}) exceeds tier_thresholds.high ({})",
                self.tier_thresholds.medium, self.tier_thresholds.high
            )));
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/risk_logs.csv"),
            format: AuditFormat::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default.
    /// A file that exists but does not parse is a configuration error.
    pub fn load(path: &Path) -> AssessResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| AssessError::io(format!("reading config {}", path.display()), e))?;
        serde_json::from_str(&data).map_err(|e| {
            AssessError::Configuration(format!("invalid config {}: {}", path.display(), e))
        })
    }
}
