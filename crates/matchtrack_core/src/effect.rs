use std::time::Duration;

use crate::{FileRef, JobId, JobRecord, Thresholds};

/// Delay between two status queries of a running job.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Save name used when the service reports no result file name.
pub const DEFAULT_RESULT_FILE_NAME: &str = "results.xlsx";

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SubmitJob {
        cbx: FileRef,
        hc: FileRef,
        thresholds: Option<Thresholds>,
    },
    SchedulePoll { job_id: JobId, delay: Duration },
    CancelPolling { job_id: JobId },
    /// Write the full, already truncated history to storage.
    PersistHistory { records: Vec<JobRecord> },
    ClearStoredHistory,
    DownloadResult { job_id: JobId, file_name: String },
}
