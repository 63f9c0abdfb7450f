//! End-to-end assessment: validate → scan → features → models → fusion → audit.
//! Any failing stage ends the request; nothing partial is returned or logged.

use crate::audit::{serialize_flag, AuditRecord, DecisionLogger, FileAuditLog};
use crate::config::{EngineConfig, RiskConfig};
use crate::error::{AssessResult, InputError};
use crate::features::{FeatureAssembler, RawInput};
use crate::model::{ModelBundle, SensitivityLabel};
use crate::risk::{Decision, RiskEngine, RiskScore};
use crate::scanner::{PiiScanner, ScanResult};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Uploaded file, either already on disk or held in memory.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, Default)]
pub struct AssessmentRequest {
    pub file: Option<FileSource>,
    pub input: RawInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detected {
    #[serde(serialize_with = "serialize_flag")]
    pub email: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub pan: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub aadhaar: bool,
}

impl From<&ScanResult> for Detected {
    fn from(scan: &ScanResult) -> Self {
        Self {
            email: scan.contains_email,
            pan: scan.contains_pan,
            aadhaar: scan.contains_aadhaar,
        }
    }
}

/// Result handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub data_sensitivity: SensitivityLabel,
    pub risk_score: u32,
    pub decision: Decision,
    pub detected: Detected,
}

impl RiskAssessment {
    fn new(label: SensitivityLabel, risk: &RiskScore, scan: &ScanResult) -> Self {
        Self {
            data_sensitivity: label,
            risk_score: risk.score,
            decision: risk.decision,
            detected: Detected::from(scan),
        }
    }
}

/// Holds only read-only state; one instance serves concurrent requests.
pub struct Assessor {
    models: ModelBundle,
    scanner: PiiScanner,
    risk: RiskEngine,
    audit: Arc<dyn DecisionLogger>,
}

impl Assessor {
    /// Fails if the classifier can emit a label the risk table does not cover.
    pub fn new(
        models: ModelBundle,
        risk: RiskConfig,
        audit: Arc<dyn DecisionLogger>,
    ) -> AssessResult<Self> {
        risk.validate(&models.classifier().vocabulary())?;
        Ok(Self {
            models,
            scanner: PiiScanner::new(),
            risk: RiskEngine::new(risk),
            audit,
        })
    }

    /// Load models and open the audit log as configured.
    pub fn from_config(config: &EngineConfig) -> AssessResult<Self> {
        let models = ModelBundle::load(&config.model)?;
        let audit = Arc::new(FileAuditLog::open(&config.audit)?);
        Self::new(models, config.risk.clone(), audit)
    }

    pub fn with_scanner(mut self, scanner: PiiScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn assess(&self, request: &AssessmentRequest) -> AssessResult<RiskAssessment> {
        let id = Uuid::new_v4();
        let span = info_span!("assessment", %id);
        let _enter = span.enter();

        let result = self.run(request);
        match &result {
            Ok(a) => info!(
                label = %a.data_sensitivity,
                risk_score = a.risk_score,
                decision = %a.decision,
                "assessment complete"
            ),
            Err(e) if e.is_client_error() => warn!(reason = %e, "assessment rejected"),
            Err(e) => error!(kind = ?e.kind(), error = %e, "assessment failed"),
        }
        result
    }

    fn run(&self, request: &AssessmentRequest) -> AssessResult<RiskAssessment> {
        let file = request.file.as_ref().ok_or(InputError::MissingFile)?;
        let input = request.input.parse()?;

        let scan = match file {
            FileSource::Path(path) => self.scanner.scan_file(path)?,
            FileSource::Bytes(bytes) => self.scanner.scan_bytes(bytes),
        };
        let features = FeatureAssembler::assemble(&scan, &input);

        let label = self.models.classifier().classify(&features.file)?;
        let anomaly = self.models.detector().score(&features.behavior)?;
        debug!(label = %label, anomaly = ?anomaly.flag, raw = anomaly.raw, "models evaluated");

        let risk = self.risk.fuse(label, anomaly.flag)?;
        self.audit
            .record(&AuditRecord::new(&scan, &input, label, &anomaly, &risk))?;

        Ok(RiskAssessment::new(label, &risk, &scan))
    }
}
