use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use matchtrack_core::{JobRecord, TerminalStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use track_logging::{track_info, track_warn};

use crate::persist::{AtomicFileWriter, PersistError};

/// Schema version written into every history slot.
pub const HISTORY_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_HISTORY_SLOT: &str = "job_history";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot encode history: {0}")]
    Encode(String),
    #[error("cannot decode history: {0}")]
    Decode(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Durable home of the job history.
///
/// Implementations hold one slot; `save` always receives the complete,
/// already truncated sequence.
pub trait HistoryStorage: Send {
    /// An absent slot is an empty history, not an error.
    fn load(&self) -> Result<Vec<JobRecord>, StorageError>;

    fn save(&self, records: &[JobRecord]) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedJob {
    job_id: String,
    status: TerminalStatus,
    #[serde(default)]
    cbx_file: Option<String>,
    #[serde(default)]
    hc_file: Option<String>,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    processing_time: Option<u64>,
    #[serde(default)]
    result_file: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedHistory {
    version: u32,
    #[serde(default)]
    jobs: Vec<PersistedJob>,
}

impl From<&JobRecord> for PersistedJob {
    fn from(record: &JobRecord) -> Self {
        Self {
            job_id: record.job_id.clone(),
            status: record.status,
            cbx_file: record.cbx_file_name.clone(),
            hc_file: record.hc_file_name.clone(),
            timestamp: record.timestamp,
            processing_time: record.processing_time,
            result_file: record.result_file_name.clone(),
            error: record.error_message.clone(),
        }
    }
}

impl From<PersistedJob> for JobRecord {
    fn from(job: PersistedJob) -> Self {
        let (result_file_name, error_message) = match job.status {
            TerminalStatus::Completed => (job.result_file, None),
            TerminalStatus::Failed => (None, job.error),
        };
        JobRecord {
            job_id: job.job_id,
            status: job.status,
            cbx_file_name: job.cbx_file,
            hc_file_name: job.hc_file,
            timestamp: job.timestamp,
            processing_time: job.processing_time,
            result_file_name,
            error_message,
        }
    }
}

/// Encodes a history sequence in the slot format.
pub fn encode_history(records: &[JobRecord]) -> Result<String, StorageError> {
    let state = PersistedHistory {
        version: HISTORY_SCHEMA_VERSION,
        jobs: records.iter().map(PersistedJob::from).collect(),
    };
    let pretty = ron::ser::PrettyConfig::new();
    ron::ser::to_string_pretty(&state, pretty).map_err(|err| StorageError::Encode(err.to_string()))
}

/// Decodes a slot. Slots written by a newer schema are read best-effort.
pub fn decode_history(content: &str) -> Result<Vec<JobRecord>, StorageError> {
    let state: PersistedHistory =
        ron::from_str(content).map_err(|err| StorageError::Decode(err.to_string()))?;
    if state.version > HISTORY_SCHEMA_VERSION {
        track_warn!(
            "History slot has schema version {} (supported {}); reading known fields only",
            state.version,
            HISTORY_SCHEMA_VERSION
        );
    }
    Ok(state.jobs.into_iter().map(JobRecord::from).collect())
}

/// History slot stored as `{dir}/{slot}.ron`.
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    writer: AtomicFileWriter,
    file_name: String,
}

impl FileHistoryStorage {
    pub fn new(dir: impl Into<PathBuf>, slot: &str) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
            file_name: format!("{slot}.ron"),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(&self.file_name)
    }

    fn read_slot(path: &Path) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl HistoryStorage for FileHistoryStorage {
    fn load(&self) -> Result<Vec<JobRecord>, StorageError> {
        let path = self.path();
        let Some(content) = Self::read_slot(&path)? else {
            return Ok(Vec::new());
        };
        let records = decode_history(&content)?;
        track_info!("Loaded {} history records from {:?}", records.len(), path);
        Ok(records)
    }

    fn save(&self, records: &[JobRecord]) -> Result<(), StorageError> {
        let content = encode_history(records)?;
        self.writer.write(&self.file_name, content.as_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local slot. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStorage {
    slot: Arc<Mutex<Option<String>>>,
    fail_writes: bool,
}

impl MemoryHistoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot whose writes always fail, for exercising degraded operation.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn with_records(records: &[JobRecord]) -> Result<Self, StorageError> {
        let storage = Self::new();
        storage.save(records)?;
        Ok(storage)
    }

    /// Raw slot content, if anything was written.
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "history slot is read-only",
            )));
        }
        Ok(())
    }
}

impl HistoryStorage for MemoryHistoryStorage {
    fn load(&self) -> Result<Vec<JobRecord>, StorageError> {
        match self.lock().as_deref() {
            Some(content) => decode_history(content),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[JobRecord]) -> Result<(), StorageError> {
        self.check_writable()?;
        let content = encode_history(records)?;
        *self.lock() = Some(content);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check_writable()?;
        *self.lock() = None;
        Ok(())
    }
}
