//! Independent single-pattern PII predicates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";
/// Five uppercase letters, four digits, one uppercase letter (PAN-shaped tax ID).
pub const TAX_ID_PATTERN: &str = r"[A-Z]{5}[0-9]{4}[A-Z]";
/// Twelve digits, optionally grouped 4-4-4 by single spaces (Aadhaar-shaped national ID).
/// No checksum validation.
pub const NATIONAL_ID_PATTERN: &str = r"\b\d{4} ?\d{4} ?\d{4}\b";

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern"));
static TAX_ID: Lazy<Regex> = Lazy::new(|| Regex::new(TAX_ID_PATTERN).expect("tax id pattern"));
static NATIONAL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(NATIONAL_ID_PATTERN).expect("national id pattern"));

/// Which [`ScanResult`](super::ScanResult) flag a detector feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    Email,
    TaxId,
    NationalId,
}

/// Existence check over decoded content. Not extraction, not counting.
pub trait Detector: Send + Sync {
    fn kind(&self) -> PiiKind;

    fn matches(&self, content: &str) -> bool;
}

pub struct PatternDetector {
    kind: PiiKind,
    regex: Regex,
}

impl PatternDetector {
    pub fn new(kind: PiiKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn email() -> Self {
        Self::builtin(PiiKind::Email, &EMAIL)
    }

    pub fn tax_id() -> Self {
        Self::builtin(PiiKind::TaxId, &TAX_ID)
    }

    pub fn national_id() -> Self {
        Self::builtin(PiiKind::NationalId, &NATIONAL_ID)
    }

    fn builtin(kind: PiiKind, regex: &Lazy<Regex>) -> Self {
        Self {
            kind,
            regex: Regex::clone(regex),
        }
    }
}

impl Detector for PatternDetector {
    fn kind(&self) -> PiiKind {
        self.kind
    }

    fn matches(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}

pub fn builtin_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(PatternDetector::email()),
        Box::new(PatternDetector::tax_id()),
        Box::new(PatternDetector::national_id()),
    ]
}
