use std::path::PathBuf;
use std::time::Duration;

use crate::effect::{DEFAULT_RESULT_FILE_NAME, POLL_INTERVAL};
use crate::{
    AppState, Effect, FileRef, InputSlot, JobId, JobRecord, JobStatus, LiveJobStatus, LogLevel,
    Msg, Stamp, StartError, Thresholds, ValidationError,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// `now` is the moment the message is handled; every elapsed-time and
/// timestamp decision is taken from it.
pub fn update(mut state: AppState, msg: Msg, now: Stamp) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested {
            cbx,
            hc,
            thresholds,
        } => start_requested(&mut state, cbx, hc, thresholds, now),
        Msg::SubmitAccepted(status) => submit_accepted(&mut state, status, now),
        Msg::SubmitFailed { message } => {
            if state.is_uploading() {
                state.abandon_submission();
                state.set_error(message.clone());
                state.push_log(LogLevel::Error, format!("Failed: {message}"), now.wall);
                state.set_start_error(StartError::Transport(message));
            }
            Vec::new()
        }
        Msg::StatusPolled { job_id, result } => status_polled(&mut state, job_id, result, now),
        Msg::DownloadRequested { job_id } => {
            let file_name = state
                .downloadable_job()
                .filter(|live| live.job_id.as_deref() == Some(job_id.as_str()))
                .map(|live| {
                    live.result_file_name
                        .clone()
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_RESULT_FILE_NAME.to_string())
                });
            match file_name {
                Some(file_name) => {
                    state.push_log(LogLevel::Info, "Downloading results...", now.wall);
                    vec![Effect::DownloadResult { job_id, file_name }]
                }
                None => {
                    state.push_log(
                        LogLevel::Error,
                        format!(
                            "Download failed: job {} has no completed result",
                            short_id(&job_id)
                        ),
                        now.wall,
                    );
                    Vec::new()
                }
            }
        }
        Msg::DownloadFinished { result, .. } => {
            download_finished(&mut state, result, now);
            Vec::new()
        }
        Msg::ResetClicked => {
            let effects = state
                .live_job_id()
                .map(|job_id| {
                    vec![Effect::CancelPolling {
                        job_id: job_id.to_string(),
                    }]
                })
                .unwrap_or_default();
            state.reset_live();
            state.push_log(LogLevel::Info, "Reset", now.wall);
            effects
        }
        Msg::ClearLogClicked => {
            state.clear_log();
            Vec::new()
        }
        Msg::ClearHistoryClicked => {
            state.clear_history();
            state.push_log(LogLevel::Info, "History cleared", now.wall);
            vec![Effect::ClearStoredHistory]
        }
        Msg::HistoryLoaded(records) => {
            state.hydrate_history(records);
            Vec::new()
        }
        Msg::HistorySaveFailed { message } => {
            state.push_log(
                LogLevel::Error,
                format!("History not saved: {message}"),
                now.wall,
            );
            Vec::new()
        }
        Msg::Tick => {
            if state.is_in_flight() {
                state.refresh_timer(now.instant);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn start_requested(
    state: &mut AppState,
    cbx: Option<FileRef>,
    hc: Option<FileRef>,
    thresholds: Option<Thresholds>,
    now: Stamp,
) -> Vec<Effect> {
    if state.is_in_flight() {
        state.push_log(LogLevel::Error, "Error: A job is already running", now.wall);
        state.set_start_error(StartError::AlreadyRunning);
        return Vec::new();
    }

    let (cbx, hc) = match (cbx, hc) {
        (Some(cbx), Some(hc)) => (cbx, hc),
        (cbx, _) => {
            let missing = if cbx.is_none() {
                InputSlot::Cbx
            } else {
                InputSlot::Hc
            };
            state.set_error("Please select both files");
            state.push_log(LogLevel::Error, "Error: Both files required", now.wall);
            state.set_start_error(ValidationError::MissingFile(missing).into());
            return Vec::new();
        }
    };

    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = state.live_job_id() {
        effects.push(Effect::CancelPolling {
            job_id: previous.to_string(),
        });
    }

    state.begin_submission(
        LiveJobStatus::uploading(&now),
        cbx.name.clone(),
        hc.name.clone(),
        now.instant,
    );
    state.push_log(
        LogLevel::Info,
        format!("Uploading CBX: {} ({})", cbx.name, cbx.size_label()),
        now.wall,
    );
    state.push_log(
        LogLevel::Info,
        format!("Uploading HC: {} ({})", hc.name, hc.size_label()),
        now.wall,
    );
    if let Some(thresholds) = thresholds {
        state.push_log(
            LogLevel::Info,
            format!(
                "Matching thresholds: company={} address={}",
                thresholds.min_company_ratio, thresholds.min_address_ratio
            ),
            now.wall,
        );
    }

    effects.push(Effect::SubmitJob {
        cbx,
        hc,
        thresholds,
    });
    effects
}

fn submit_accepted(state: &mut AppState, status: LiveJobStatus, now: Stamp) -> Vec<Effect> {
    if !state.is_uploading() {
        return Vec::new();
    }
    let Some(job_id) = status.job_id.clone() else {
        return Vec::new();
    };

    state.push_log(
        LogLevel::Info,
        format!("Job started: {}...", short_id(&job_id)),
        now.wall,
    );

    if status.status.is_terminal() {
        state.set_live(LiveJobStatus {
            status: JobStatus::Processing,
            ..status.clone()
        });
        return status_polled(state, job_id, Ok(status), now);
    }

    state.set_live(status);
    vec![Effect::SchedulePoll {
        job_id,
        delay: Duration::ZERO,
    }]
}

fn status_polled(
    state: &mut AppState,
    job_id: JobId,
    result: Result<LiveJobStatus, String>,
    now: Stamp,
) -> Vec<Effect> {
    if !state.accepts_observation(&job_id) {
        return Vec::new();
    }

    match result {
        Ok(status) if status.job_id.as_deref() != Some(job_id.as_str()) => {
            let message = format!(
                "status for job {} reported job {}",
                short_id(&job_id),
                status.job_id.as_deref().unwrap_or("<none>")
            );
            fail_live_job(state, &job_id, message, now)
        }
        Ok(status) => match status.status {
            JobStatus::Queued | JobStatus::Processing => {
                state.set_live(status);
                state.refresh_timer(now.instant);
                vec![Effect::SchedulePoll {
                    job_id,
                    delay: POLL_INTERVAL,
                }]
            }
            JobStatus::Completed => {
                let processing_time = state.stop_timer(now.instant);
                let record = JobRecord::completed(
                    job_id,
                    now.wall,
                    processing_time,
                    status.result_file_name.clone(),
                );
                state.set_live(status);
                state.push_log(LogLevel::Success, "Job completed!", now.wall);
                persist(state, record)
            }
            JobStatus::Failed => {
                let processing_time = state.stop_timer(now.instant);
                let text = status.failure_text();
                state.set_live(status);
                state.set_error(text.clone());
                state.push_log(LogLevel::Error, format!("Job failed: {text}"), now.wall);
                persist(
                    state,
                    JobRecord::failed(job_id, now.wall, processing_time, text),
                )
            }
        },
        Err(message) => fail_live_job(state, &job_id, message, now),
    }
}

/// Transport failure while tracking: terminal for the job, no retry.
fn fail_live_job(state: &mut AppState, job_id: &str, message: String, now: Stamp) -> Vec<Effect> {
    let processing_time = state.stop_timer(now.instant);
    let created_at = state
        .live()
        .map(|live| live.created_at.clone())
        .unwrap_or_default();
    state.set_live(LiveJobStatus::failed_locally(job_id, &created_at, &message));
    state.set_error(message.clone());
    state.push_log(LogLevel::Error, format!("Error: {message}"), now.wall);
    persist(
        state,
        JobRecord::failed(job_id, now.wall, processing_time, message),
    )
}

fn persist(state: &mut AppState, record: JobRecord) -> Vec<Effect> {
    if state.commit_record(record) {
        vec![Effect::PersistHistory {
            records: state.history().records().to_vec(),
        }]
    } else {
        Vec::new()
    }
}

fn download_finished(
    state: &mut AppState,
    result: Result<PathBuf, String>,
    now: Stamp,
) {
    match result {
        Ok(path) => state.push_log(
            LogLevel::Success,
            format!("Downloaded successfully: {}", path.display()),
            now.wall,
        ),
        Err(message) => state.push_log(
            LogLevel::Error,
            format!("Download failed: {message}"),
            now.wall,
        ),
    }
    state.mark_dirty();
}

/// First eight characters of a job id, as shown in the activity log.
pub fn short_id(job_id: &str) -> String {
    job_id.chars().take(8).collect()
}
