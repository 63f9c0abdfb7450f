//! Leakguard — data-leakage risk scoring for uploaded files.
//!
//! Modular structure:
//! - [`scanner`] — PII content scan (email, tax-ID-like, national-ID-like)
//! - [`features`] — Caller input validation and model feature assembly
//! - [`model`] — Sensitivity classifier and anomaly detector adapters (ONNX)
//! - [`risk`] — Risk fusion engine
//! - [`audit`] — Append-only decision audit log
//! - [`assess`] — End-to-end orchestration
//! - [`logging`] — Structured tracing setup

pub mod config;
pub mod error;
pub mod scanner;
pub mod features;
pub mod model;
pub mod risk;
pub mod audit;
pub mod assess;
pub mod logging;

pub use config::EngineConfig;
pub use error::{AssessError, AssessResult, ErrorKind, InputError};
pub use scanner::{PiiScanner, ScanResult};
pub use features::{BehaviorFeatures, FeatureAssembler, FileFeatures, RawInput, UserInput};
pub use model::{AnomalyDetector, AnomalyFlag, ModelBundle, SensitivityClassifier, SensitivityLabel};
pub use risk::{Decision, RiskEngine};
pub use audit::{DecisionLogger, FileAuditLog, MemoryAuditLog};
pub use assess::{AssessmentRequest, Assessor, FileSource, RiskAssessment};
pub use logging::StructuredLogger;
