//! Integration test: config load, request validation, scan, mock models, fusion, audit.

use leakguard::{
    assess::{AssessmentRequest, Assessor, FileSource},
    audit::{DecisionLogger, FileAuditLog, MemoryAuditLog},
    config::{AuditFormat, EngineConfig, RiskConfig},
    error::{AssessError, AssessResult, ErrorKind},
    features::{BehaviorFeatures, FileFeatures, RawInput},
    model::{AnomalyDetector, AnomalyFlag, AnomalyReading, ModelBundle, SensitivityClassifier, SensitivityLabel},
    risk::Decision,
    scanner::{PatternDetector, PiiKind, PiiScanner},
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FixedClassifier(SensitivityLabel);

impl SensitivityClassifier for FixedClassifier {
    fn classify(&self, _features: &FileFeatures) -> AssessResult<SensitivityLabel> {
        Ok(self.0)
    }
}

struct FixedDetector(AnomalyFlag);

impl AnomalyDetector for FixedDetector {
    fn score(&self, _features: &BehaviorFeatures) -> AssessResult<AnomalyReading> {
        Ok(AnomalyReading::from_flag(self.0))
    }
}

/// Counts calls; used to prove rejected input never reaches inference.
#[derive(Default)]
struct SpyClassifier {
    calls: Arc<AtomicUsize>,
}

impl SensitivityClassifier for SpyClassifier {
    fn classify(&self, _features: &FileFeatures) -> AssessResult<SensitivityLabel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SensitivityLabel::Public)
    }
}

struct SpyDetector {
    calls: Arc<AtomicUsize>,
}

impl AnomalyDetector for SpyDetector {
    fn score(&self, _features: &BehaviorFeatures) -> AssessResult<AnomalyReading> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AnomalyReading::from_flag(AnomalyFlag::Normal))
    }
}

struct FailingDetector;

impl AnomalyDetector for FailingDetector {
    fn score(&self, _features: &BehaviorFeatures) -> AssessResult<AnomalyReading> {
        Err(AssessError::ModelInference("session crashed".into()))
    }
}

/// Label follows the file type code; flag follows the login hour.
struct EchoClassifier;

impl SensitivityClassifier for EchoClassifier {
    fn classify(&self, features: &FileFeatures) -> AssessResult<SensitivityLabel> {
        Ok(SensitivityLabel::ALL[features.file_type_encoded as usize % 4])
    }
}

struct NightOwlDetector;

impl AnomalyDetector for NightOwlDetector {
    fn score(&self, features: &BehaviorFeatures) -> AssessResult<AnomalyReading> {
        let flag = if features.login_hour < 6 {
            AnomalyFlag::Anomalous
        } else {
            AnomalyFlag::Normal
        };
        Ok(AnomalyReading::from_flag(flag))
    }
}

fn raw(hour: &str) -> RawInput {
    RawInput {
        file_type_encoded: Some("1".into()),
        downloads_mb: Some("120.5".into()),
        uploads_mb: Some("3".into()),
        login_hour: Some(hour.into()),
        access_frequency: Some("14".into()),
    }
}

fn request(content: &str, hour: &str) -> AssessmentRequest {
    AssessmentRequest {
        file: Some(FileSource::Bytes(content.as_bytes().to_vec())),
        input: raw(hour),
    }
}

fn assessor(
    label: SensitivityLabel,
    flag: AnomalyFlag,
) -> (Assessor, Arc<MemoryAuditLog>) {
    let audit = Arc::new(MemoryAuditLog::new());
    let models = ModelBundle::new(FixedClassifier(label), FixedDetector(flag));
    let a = Assessor::new(models, RiskConfig::default(), audit.clone()).unwrap();
    (a, audit)
}

#[test]
fn config_load_default() {
    let c = EngineConfig::load(Path::new("nonexistent.json")).unwrap();
    assert_eq!(c.risk.behavior_risk_increment, 5);
    assert_eq!(c.risk.tier_thresholds.high, 8);
    assert_eq!(c.risk.tier_thresholds.medium, 4);
    assert_eq!(c.risk.base_risk_table[&SensitivityLabel::Internal], 2);
}

#[test]
fn config_load_malformed_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = EngineConfig::load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn confidential_and_anomalous_is_high() {
    let (a, audit) = assessor(SensitivityLabel::Confidential, AnomalyFlag::Anomalous);
    let r = a.assess(&request("plain text", "3")).unwrap();
    assert_eq!(r.risk_score, 9);
    assert_eq!(r.decision, Decision::High);
    assert_eq!(audit.len(), 1);
}

#[test]
fn public_and_normal_is_low() {
    let (a, _) = assessor(SensitivityLabel::Public, AnomalyFlag::Normal);
    let r = a.assess(&request("plain text", "10")).unwrap();
    assert_eq!(r.risk_score, 0);
    assert_eq!(r.decision, Decision::Low);
}

#[test]
fn internal_and_anomalous_is_medium() {
    let (a, _) = assessor(SensitivityLabel::Internal, AnomalyFlag::Anomalous);
    let r = a.assess(&request("plain text", "10")).unwrap();
    assert_eq!(r.risk_score, 7);
    assert_eq!(r.decision, Decision::Medium);
}

#[test]
fn result_json_shape() {
    let (a, _) = assessor(SensitivityLabel::HighlySensitive, AnomalyFlag::Normal);
    let r = a
        .assess(&request("reach me: a.b@example.com, UID 1234 5678 9012", "9"))
        .unwrap();
    let json: serde_json::Value = serde_json::to_value(r).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "data_sensitivity": "Highly_Sensitive",
            "risk_score": 6,
            "decision": "MEDIUM RISK",
            "detected": {"email": 1, "pan": 0, "aadhaar": 1}
        })
    );
}

#[test]
fn bad_login_hour_never_reaches_models() {
    let classifier_calls = Arc::new(AtomicUsize::new(0));
    let detector_calls = Arc::new(AtomicUsize::new(0));
    let models = ModelBundle::new(
        SpyClassifier {
            calls: classifier_calls.clone(),
        },
        SpyDetector {
            calls: detector_calls.clone(),
        },
    );
    let audit = Arc::new(MemoryAuditLog::new());
    let a = Assessor::new(models, RiskConfig::default(), audit.clone()).unwrap();

    for hour in ["24", "-1", "100"] {
        let err = a.assess(&request("x", hour)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert_eq!(err.to_response().error, "Login hour must be between 0 and 23");
        assert_eq!(err.status_code(), 400);
    }
    assert_eq!(classifier_calls.load(Ordering::SeqCst), 0);
    assert_eq!(detector_calls.load(Ordering::SeqCst), 0);
    assert!(audit.is_empty());

    a.assess(&request("x", "23")).unwrap();
    assert_eq!(classifier_calls.load(Ordering::SeqCst), 1);
    assert_eq!(detector_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_file_and_bad_fields_are_rejected() {
    let (a, audit) = assessor(SensitivityLabel::Public, AnomalyFlag::Normal);

    let no_file = AssessmentRequest {
        file: None,
        input: raw("3"),
    };
    let err = a.assess(&no_file).unwrap_err();
    assert_eq!(err.to_response().error, "No file uploaded");

    let mut bad = request("x", "3");
    bad.input.downloads_mb = Some("lots".into());
    let err = a.assess(&bad).unwrap_err();
    assert_eq!(err.to_response().error, "Invalid user input");
    assert_eq!(err.status_code(), 400);

    let mut missing = request("x", "3");
    missing.input.access_frequency = None;
    assert_eq!(
        a.assess(&missing).unwrap_err().to_response().error,
        "Invalid user input"
    );

    assert!(audit.is_empty());
}

#[test]
fn unreadable_file_is_io_error() {
    let (a, audit) = assessor(SensitivityLabel::Public, AnomalyFlag::Normal);
    let dir = tempfile::tempdir().unwrap();
    let req = AssessmentRequest {
        file: Some(FileSource::Path(dir.path().join("gone.txt"))),
        input: raw("3"),
    };
    let err = a.assess(&req).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("gone.txt"));
    let body = serde_json::to_string(&err.to_response()).unwrap();
    assert_eq!(body, r#"{"error":"Internal error"}"#);
    assert!(audit.is_empty());
}

#[test]
fn file_on_disk_is_scanned_and_left_in_place() {
    let (a, _) = assessor(SensitivityLabel::Internal, AnomalyFlag::Normal);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.txt");
    std::fs::write(&path, b"PAN ABCDE1234F\r\n\xff").unwrap();
    let req = AssessmentRequest {
        file: Some(FileSource::Path(path.clone())),
        input: raw("12"),
    };
    let r = a.assess(&req).unwrap();
    assert!(r.detected.pan);
    assert!(!r.detected.email);
    assert_eq!(std::fs::read(&path).unwrap(), b"PAN ABCDE1234F\r\n\xff");
}

#[test]
fn inference_failure_aborts_without_audit() {
    let audit = Arc::new(MemoryAuditLog::new());
    let models = ModelBundle::new(FixedClassifier(SensitivityLabel::Public), FailingDetector);
    let a = Assessor::new(models, RiskConfig::default(), audit.clone()).unwrap();
    let err = a.assess(&request("x", "3")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelInference);
    assert_eq!(err.status_code(), 500);
    assert!(audit.is_empty());
}

#[test]
fn risk_table_missing_vocabulary_label_fails_construction() {
    let risk = RiskConfig {
        base_risk_table: BTreeMap::from([
            (SensitivityLabel::Public, 0),
            (SensitivityLabel::Internal, 2),
            (SensitivityLabel::Confidential, 4),
        ]),
        ..RiskConfig::default()
    };
    let models = ModelBundle::new(
        FixedClassifier(SensitivityLabel::HighlySensitive),
        FixedDetector(AnomalyFlag::Normal),
    );
    let err = Assessor::new(models, risk, Arc::new(MemoryAuditLog::new()))
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

/// Declares a narrower vocabulary than it actually emits.
struct DriftingClassifier;

impl SensitivityClassifier for DriftingClassifier {
    fn classify(&self, _features: &FileFeatures) -> AssessResult<SensitivityLabel> {
        Ok(SensitivityLabel::HighlySensitive)
    }

    fn vocabulary(&self) -> Vec<SensitivityLabel> {
        vec![SensitivityLabel::Public]
    }
}

#[test]
fn unknown_label_at_runtime_is_configuration_error_not_zero() {
    let risk = RiskConfig {
        base_risk_table: BTreeMap::from([(SensitivityLabel::Public, 0)]),
        ..RiskConfig::default()
    };
    let audit = Arc::new(MemoryAuditLog::new());
    let models = ModelBundle::new(DriftingClassifier, FixedDetector(AnomalyFlag::Normal));
    let a = Assessor::new(models, risk, audit.clone()).unwrap();
    let err = a.assess(&request("x", "3")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(audit.is_empty());
}

#[test]
fn scanning_is_idempotent() {
    let scanner = PiiScanner::new();
    let content = "contact me at a.b@example.com\nPAN ABCDE1234F\n123456789012";
    assert_eq!(scanner.scan_text(content), scanner.scan_text(content));
}

#[test]
fn detection_examples() {
    let scanner = PiiScanner::new();
    assert!(scanner.scan_text("contact me at a.b@example.com").contains_email);
    assert!(!scanner.scan_text("contact me at a.b at example.com").contains_email);
    assert!(scanner.scan_text("1234 5678 9012").contains_aadhaar);
    assert!(scanner.scan_text("123456789012").contains_aadhaar);
    assert!(!scanner.scan_text("12345678901").contains_aadhaar);
}

#[test]
fn custom_detector_flows_through_assessment() {
    let (a, audit) = assessor(SensitivityLabel::Public, AnomalyFlag::Normal);
    let obfuscated = PatternDetector::new(PiiKind::Email, r"\w+ \[at\] \w+").unwrap();
    let a = a.with_scanner(PiiScanner::new().with_detector(Box::new(obfuscated)));

    let out = a.assess(&request("reach alice [at] example", "10")).unwrap();
    assert!(out.detected.email);
    assert!(!out.detected.pan);
    assert!(audit.records()[0].contains_email);

    let out = a.assess(&request("ABCDE1234F", "10")).unwrap();
    assert!(!out.detected.email);
    assert!(out.detected.pan);
}

#[test]
fn audit_record_reflects_request() {
    let (a, audit) = assessor(SensitivityLabel::Confidential, AnomalyFlag::Anomalous);
    a.assess(&request("a@b.io", "4")).unwrap();
    let records = audit.records();
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.content_length, 6);
    assert!(rec.contains_email);
    assert_eq!(rec.file_type_encoded, 1);
    assert_eq!(rec.downloads_mb, 120.5);
    assert_eq!(rec.login_hour, 4);
    assert_eq!(rec.anomaly_flag, -1);
    assert_eq!(rec.risk_score, 9);
    assert_eq!(rec.decision, Decision::High);
}

#[test]
fn file_audit_log_appends_csv_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("risk_logs.csv");
    let audit = Arc::new(FileAuditLog::with_format(&path, AuditFormat::Csv).unwrap());
    let models = ModelBundle::new(
        FixedClassifier(SensitivityLabel::Internal),
        FixedDetector(AnomalyFlag::Normal),
    );
    let a = Assessor::new(models, RiskConfig::default(), audit).unwrap();
    a.assess(&request("hello", "8")).unwrap();
    a.assess(&request("hello again", "9")).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let fields: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(fields.len(), 14);
    assert_eq!(
        &fields[1..],
        &["5", "0", "0", "0", "1", "120.5", "3.0", "8", "14", "Internal", "1", "2", "LOW RISK"]
    );
}

#[test]
fn file_audit_log_ndjson() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("risk_logs.ndjson");
    let audit = Arc::new(FileAuditLog::with_format(&path, AuditFormat::Ndjson).unwrap());
    let models = ModelBundle::new(
        FixedClassifier(SensitivityLabel::Public),
        FixedDetector(AnomalyFlag::Anomalous),
    );
    let a = Assessor::new(models, RiskConfig::default(), audit).unwrap();
    a.assess(&request("x", "1")).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let v: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
    assert_eq!(v["risk_score"], 5);
    assert_eq!(v["decision"], "MEDIUM RISK");
    assert_eq!(v["anomaly_flag"], -1);
    assert_eq!(v["contains_email"], 0);
}

#[test]
fn concurrent_appends_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("risk_logs.csv");
    let audit = Arc::new(FileAuditLog::with_format(&path, AuditFormat::Csv).unwrap());
    let models = ModelBundle::new(
        FixedClassifier(SensitivityLabel::Confidential),
        FixedDetector(AnomalyFlag::Normal),
    );
    let a = Arc::new(Assessor::new(models, RiskConfig::default(), audit).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let a = a.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    a.assess(&request(&"y".repeat(t + 1), "13")).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 200);
    assert!(lines.iter().all(|l| l.split(',').count() == 14));
    assert!(lines.iter().all(|l| l.ends_with(",4,MEDIUM RISK")));
}

#[test]
fn concurrent_assessments_do_not_cross_contaminate() {
    let audit = Arc::new(MemoryAuditLog::new());
    let models = ModelBundle::new(EchoClassifier, NightOwlDetector);
    let a = Arc::new(Assessor::new(models, RiskConfig::default(), audit.clone()).unwrap());

    let handles: Vec<_> = (0..16u32)
        .map(|i| {
            let a = a.clone();
            std::thread::spawn(move || {
                let hour = (i * 3) % 24;
                let email = i % 2 == 0;
                let content = if email { "x@y.org" } else { "nothing" };
                let req = AssessmentRequest {
                    file: Some(FileSource::Bytes(content.as_bytes().to_vec())),
                    input: RawInput {
                        file_type_encoded: Some(i.to_string()),
                        downloads_mb: Some("1".into()),
                        uploads_mb: Some("1".into()),
                        login_hour: Some(hour.to_string()),
                        access_frequency: Some("1".into()),
                    },
                };
                (i, hour, email, a.assess(&req).unwrap())
            })
        })
        .collect();

    let base = RiskConfig::default().base_risk_table;
    for h in handles {
        let (i, hour, email, r) = h.join().unwrap();
        let label = SensitivityLabel::ALL[i as usize % 4];
        let inc = if hour < 6 { 5 } else { 0 };
        assert_eq!(r.data_sensitivity, label);
        assert_eq!(r.risk_score, base[&label] + inc);
        assert_eq!(r.detected.email, email);
    }
    assert_eq!(audit.len(), 16);
}

#[test]
fn decision_logger_is_object_safe() {
    let sinks: Vec<Arc<dyn DecisionLogger>> = vec![Arc::new(MemoryAuditLog::new())];
    assert_eq!(sinks.len(), 1);
}
