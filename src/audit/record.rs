//! Audit record layout. Downstream consumers depend on field order and count.

use crate::features::UserInput;
use crate::model::{AnomalyReading, SensitivityLabel};
use crate::risk::{Decision, RiskScore};
use crate::scanner::ScanResult;
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

pub(crate) fn serialize_flag<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*value))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Local>,
    pub content_length: u64,
    #[serde(serialize_with = "serialize_flag")]
    pub contains_email: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub contains_pan: bool,
    #[serde(serialize_with = "serialize_flag")]
    pub contains_aadhaar: bool,
    pub file_type_encoded: i64,
    pub downloads_mb: f64,
    pub uploads_mb: f64,
    pub login_hour: u8,
    pub access_frequency: u64,
    pub data_sensitivity: SensitivityLabel,
    /// The detector's own code, before normalization
    pub anomaly_flag: i64,
    pub risk_score: u32,
    pub decision: Decision,
}

impl AuditRecord {
    pub fn new(
        scan: &ScanResult,
        input: &UserInput,
        label: SensitivityLabel,
        anomaly: &AnomalyReading,
        risk: &RiskScore,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            content_length: scan.content_length,
            contains_email: scan.contains_email,
            contains_pan: scan.contains_pan,
            contains_aadhaar: scan.contains_aadhaar,
            file_type_encoded: input.file_type_encoded,
            downloads_mb: input.downloads_mb,
            uploads_mb: input.uploads_mb,
            login_hour: input.login_hour,
            access_frequency: input.access_frequency,
            data_sensitivity: label,
            anomaly_flag: anomaly.raw,
            risk_score: risk.score,
            decision: risk.decision,
        }
    }

    /// Fourteen comma-separated fields, no trailing newline. Floats always carry a
    /// fractional part (`5.0`), flags are `0`/`1`.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.content_length,
            u8::from(self.contains_email),
            u8::from(self.contains_pan),
            u8::from(self.contains_aadhaar),
            self.file_type_encoded,
            csv_float(self.downloads_mb),
            csv_float(self.uploads_mb),
            self.login_hour,
            self.access_frequency,
            self.data_sensitivity,
            self.anomaly_flag,
            self.risk_score,
            self.decision,
        )
    }
}

/// Shortest round-trip float text. `{:?}` switches to exponent form at the same
/// magnitudes existing log readers expect; only the exponent is rewritten to the
/// signed, two-digit style (`1e+16`, `2.5e-05`).
fn csv_float(v: f64) -> String {
    let text = format!("{:?}", v);
    let Some((mantissa, exp)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}
