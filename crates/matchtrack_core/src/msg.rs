use std::path::PathBuf;

use crate::{FileRef, JobId, JobRecord, LiveJobStatus, Thresholds};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Operator asked to submit the two input files.
    StartRequested {
        cbx: Option<FileRef>,
        hc: Option<FileRef>,
        thresholds: Option<Thresholds>,
    },
    /// The service accepted the submission.
    SubmitAccepted(LiveJobStatus),
    /// The submission failed before a job was created.
    SubmitFailed { message: String },
    /// Result of one status query for `job_id`.
    StatusPolled {
        job_id: JobId,
        result: Result<LiveJobStatus, String>,
    },
    /// Operator asked for the result artifact.
    DownloadRequested { job_id: JobId },
    /// The artifact was saved, or could not be.
    DownloadFinished {
        job_id: JobId,
        result: Result<PathBuf, String>,
    },
    /// Operator returned to the submission form.
    ResetClicked,
    ClearLogClicked,
    ClearHistoryClicked,
    /// Hydrate history from durable storage.
    HistoryLoaded(Vec<JobRecord>),
    /// Writing history to durable storage failed.
    HistorySaveFailed { message: String },
    /// Display refresh tick.
    Tick,
}
