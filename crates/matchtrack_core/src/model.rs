use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Opaque identifier assigned by the matching service.
pub type JobId = String;

/// Default ratio used by the service when no thresholds are sent.
pub const DEFAULT_RATIO: u8 = 80;

/// A point in time as seen by both the monotonic and the wall clock.
///
/// Elapsed durations are always measured on `instant`; `wall` is only used for
/// the timestamps shown to the operator and stored in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub instant: Instant,
    pub wall: DateTime<Utc>,
}

impl Stamp {
    pub fn new(instant: Instant, wall: DateTime<Utc>) -> Self {
        Self { instant, wall }
    }

    pub fn now() -> Self {
        Self::new(Instant::now(), Utc::now())
    }

    /// The same stamp moved forward by `by` on both clocks.
    pub fn after(&self, by: Duration) -> Self {
        let wall = chrono::Duration::from_std(by)
            .ok()
            .and_then(|delta| self.wall.checked_add_signed(delta))
            .unwrap_or(self.wall);
        Self::new(self.instant + by, wall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a finished job, the only statuses that reach history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStatus {
    Completed,
    Failed,
}

impl From<TerminalStatus> for JobStatus {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::Completed => JobStatus::Completed,
            TerminalStatus::Failed => JobStatus::Failed,
        }
    }
}

/// Transient snapshot of the tracked job as last reported by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveJobStatus {
    /// `None` while the submission request is still in flight.
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    pub progress: f64,
    pub message: String,
    pub created_at: String,
    pub result_file_name: Option<String>,
    pub error_message: Option<String>,
}

impl LiveJobStatus {
    /// Builds a snapshot, dropping fields that the status does not allow and
    /// clamping progress into `[0, 1]`.
    pub fn new(
        job_id: impl Into<JobId>,
        status: JobStatus,
        progress: f64,
        message: impl Into<String>,
        created_at: impl Into<String>,
        result_file_name: Option<String>,
        error_message: Option<String>,
    ) -> Self {
        let (result_file_name, error_message) = match status {
            JobStatus::Queued | JobStatus::Processing => (None, None),
            JobStatus::Completed => (result_file_name, None),
            JobStatus::Failed => (None, error_message),
        };
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            job_id: Some(job_id.into()),
            status,
            progress,
            message: message.into(),
            created_at: created_at.into(),
            result_file_name,
            error_message,
        }
    }

    pub(crate) fn uploading(now: &Stamp) -> Self {
        Self {
            job_id: None,
            status: JobStatus::Processing,
            progress: 0.0,
            message: "Uploading files...".to_string(),
            created_at: now.wall.to_rfc3339(),
            result_file_name: None,
            error_message: None,
        }
    }

    pub(crate) fn failed_locally(job_id: &str, created_at: &str, message: &str) -> Self {
        Self::new(
            job_id,
            JobStatus::Failed,
            0.0,
            message,
            created_at,
            None,
            Some(message.to_string()),
        )
    }

    /// Error text for a failed job, falling back to the status message.
    pub fn failure_text(&self) -> String {
        self.error_message
            .clone()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| {
                if self.message.is_empty() {
                    "unknown error".to_string()
                } else {
                    self.message.clone()
                }
            })
    }
}

/// Persisted outcome of one job lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_id: JobId,
    pub status: TerminalStatus,
    pub cbx_file_name: Option<String>,
    pub hc_file_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub processing_time: Option<u64>,
    pub result_file_name: Option<String>,
    pub error_message: Option<String>,
}

impl JobRecord {
    pub fn completed(
        job_id: impl Into<JobId>,
        timestamp: DateTime<Utc>,
        processing_time: u64,
        result_file_name: Option<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: TerminalStatus::Completed,
            cbx_file_name: None,
            hc_file_name: None,
            timestamp,
            processing_time: Some(processing_time),
            result_file_name,
            error_message: None,
        }
    }

    pub fn failed(
        job_id: impl Into<JobId>,
        timestamp: DateTime<Utc>,
        processing_time: u64,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: TerminalStatus::Failed,
            cbx_file_name: None,
            hc_file_name: None,
            timestamp,
            processing_time: Some(processing_time),
            result_file_name: None,
            error_message: Some(error_message.into()),
        }
    }

    pub fn with_file_names(mut self, cbx: Option<String>, hc: Option<String>) -> Self {
        self.cbx_file_name = cbx;
        self.hc_file_name = hc;
        self
    }
}

/// Operator-selected input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
}

impl FileRef {
    /// Uses the last path component as the display name.
    pub fn new(path: impl Into<PathBuf>, size_bytes: Option<u64>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path,
            size_bytes,
        }
    }

    /// Size in megabytes with two decimals, as shown in the activity log.
    pub fn size_label(&self) -> String {
        match self.size_bytes {
            Some(bytes) => format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0),
            None => "size unknown".to_string(),
        }
    }
}

/// Minimum similarity ratios forwarded to the matching service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_company_ratio: u8,
    pub min_address_ratio: u8,
}

impl Thresholds {
    pub fn new(min_company_ratio: u32, min_address_ratio: u32) -> Result<Self, ValidationError> {
        Ok(Self {
            min_company_ratio: check_ratio("min_company_ratio", min_company_ratio)?,
            min_address_ratio: check_ratio("min_address_ratio", min_address_ratio)?,
        })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_company_ratio: DEFAULT_RATIO,
            min_address_ratio: DEFAULT_RATIO,
        }
    }
}

fn check_ratio(name: &'static str, value: u32) -> Result<u8, ValidationError> {
    u8::try_from(value)
        .ok()
        .filter(|ratio| *ratio <= 100)
        .ok_or(ValidationError::RatioOutOfRange { name, value })
}

/// Returned to the caller once the service has accepted a job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobHandle {
    pub job_id: JobId,
    pub initial_status: JobStatus,
}
