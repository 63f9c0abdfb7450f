//! PII content scanner: decode file content, run detectors, report flags and length.

mod detectors;

pub use detectors::{
    builtin_detectors, Detector, PatternDetector, PiiKind, EMAIL_PATTERN, NATIONAL_ID_PATTERN,
    TAX_ID_PATTERN,
};

use crate::error::{AssessError, AssessResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Per-file scan outcome. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanResult {
    /// Characters in the decoded content
    pub content_length: u64,
    pub contains_email: bool,
    pub contains_pan: bool,
    pub contains_aadhaar: bool,
}

impl ScanResult {
    fn flag(&mut self, kind: PiiKind) {
        match kind {
            PiiKind::Email => self.contains_email = true,
            PiiKind::TaxId => self.contains_pan = true,
            PiiKind::NationalId => self.contains_aadhaar = true,
        }
    }
}

/// Decode as UTF-8, dropping undecodable bytes, with text-mode newline handling
/// (`\r\n` and lone `\r` read as `\n`).
pub fn decode_content(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    if text.contains('\r') {
        text = text.replace("\r\n", "\n").replace('\r', "\n");
    }
    text
}

pub struct PiiScanner {
    detectors: Vec<Box<dyn Detector>>,
}

impl Default for PiiScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PiiScanner {
    /// Scanner with the email, tax-ID and national-ID detectors.
    pub fn new() -> Self {
        Self {
            detectors: builtin_detectors(),
        }
    }

    /// Register an extra detector; its matches OR into the flag for its kind.
    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    pub fn scan_text(&self, content: &str) -> ScanResult {
        let mut result = ScanResult {
            content_length: content.chars().count() as u64,
            ..ScanResult::default()
        };
        for detector in &self.detectors {
            if detector.matches(content) {
                result.flag(detector.kind());
            }
        }
        result
    }

    pub fn scan_bytes(&self, bytes: &[u8]) -> ScanResult {
        self.scan_text(&decode_content(bytes))
    }

    /// Read the whole file and scan it. The file is neither modified nor moved.
    pub fn scan_file(&self, path: &Path) -> AssessResult<ScanResult> {
        let bytes = std::fs::read(path)
            .map_err(|e| AssessError::io(format!("reading {}", path.display()), e))?;
        let result = self.scan_bytes(&bytes);
        debug!(
            path = %path.display(),
            content_length = result.content_length,
            email = result.contains_email,
            pan = result.contains_pan,
            aadhaar = result.contains_aadhaar,
            "file scanned"
        );
        Ok(result)
    }
}
