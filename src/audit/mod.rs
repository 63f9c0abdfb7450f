//! Decision audit log: one append-only record per completed assessment.

mod record;

pub use record::AuditRecord;
pub(crate) use record::serialize_flag;

use crate::config::{AuditConfig, AuditFormat};
use crate::error::{AssessError, AssessResult};
use crate::logging::StructuredLogger;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait DecisionLogger: Send + Sync {
    fn record(&self, record: &AuditRecord) -> AssessResult<()>;
}

/// Append-only file sink. Appends are serialized; the file is opened and closed per record.
pub struct FileAuditLog {
    path: PathBuf,
    format: AuditFormat,
    write_lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn open(config: &AuditConfig) -> AssessResult<Self> {
        Self::with_format(&config.path, config.format)
    }

    pub fn with_format(path: &Path, format: AuditFormat) -> AssessResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AssessError::io(format!("creating audit dir {}", parent.display()), e)
            })?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            format,
            write_lock: Mutex::new(()),
        })
    }

    fn render(&self, record: &AuditRecord) -> std::io::Result<Vec<u8>> {
        let mut line = Vec::with_capacity(160);
        match self.format {
            AuditFormat::Csv => writeln!(line, "{}", record.to_csv_line())?,
            AuditFormat::Ndjson => StructuredLogger::emit_json(record, &mut line)?,
        }
        Ok(line)
    }
}

impl DecisionLogger for FileAuditLog {
    fn record(&self, record: &AuditRecord) -> AssessResult<()> {
        let io_err = |e: std::io::Error| AssessError::io(format!("appending to {}", self.path.display()), e);
        let line = self.render(record).map_err(io_err)?;

        // The guard protects no data, only the file; a poisoned lock is still usable.
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(&line).map_err(io_err)?;
        file.flush().map_err(io_err)
    }
}

/// In-process sink, for embedding and tests.
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DecisionLogger for MemoryAuditLog {
    fn record(&self, record: &AuditRecord) -> AssessResult<()> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
        Ok(())
    }
}
