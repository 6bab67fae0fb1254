use std::time::Duration;

use matchtrack_core::{
    update, AppState, Effect, FileRef, JobStatus, LiveJobStatus, LogLevel, Msg, Stamp,
    TerminalStatus, POLL_INTERVAL,
};

const JOB: &str = "5f2c9e01";

fn status(status: JobStatus, progress: f64) -> LiveJobStatus {
    LiveJobStatus::new(
        JOB,
        status,
        progress,
        "working",
        "2026-10-19T07:00:00",
        Some("out.xlsx".to_string()),
        Some("bad header".to_string()),
    )
}

/// Starts a job at `t0` and feeds the submission response.
fn running_job(t0: Stamp) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::StartRequested {
            cbx: Some(FileRef::new("cbx.csv", Some(10))),
            hc: Some(FileRef::new("hc.csv", Some(10))),
            thresholds: None,
        },
        t0,
    );
    let (state, _) = update(
        state,
        Msg::SubmitAccepted(status(JobStatus::Processing, 0.0)),
        t0,
    );
    state
}

fn polled(state: AppState, result: Result<LiveJobStatus, String>, at: Stamp) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::StatusPolled {
            job_id: JOB.to_string(),
            result,
        },
        at,
    )
}

#[test]
fn processing_status_never_carries_result_or_error() {
    let live = status(JobStatus::Processing, 0.4);
    assert_eq!(live.result_file_name, None);
    assert_eq!(live.error_message, None);

    let completed = status(JobStatus::Completed, 1.0);
    assert_eq!(completed.result_file_name.as_deref(), Some("out.xlsx"));
    assert_eq!(completed.error_message, None);

    let failed = status(JobStatus::Failed, 0.2);
    assert_eq!(failed.result_file_name, None);
    assert_eq!(failed.error_message.as_deref(), Some("bad header"));
}

#[test]
fn progress_is_clamped() {
    assert_eq!(status(JobStatus::Processing, 1.7).progress, 1.0);
    assert_eq!(status(JobStatus::Processing, -0.3).progress, 0.0);
    assert_eq!(status(JobStatus::Processing, f64::NAN).progress, 0.0);
}

#[test]
fn non_terminal_poll_reschedules_after_one_second() {
    let t0 = Stamp::now();
    let state = running_job(t0);

    let (state, effects) = polled(state, Ok(status(JobStatus::Queued, 0.0)), t0);
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            job_id: JOB.to_string(),
            delay: POLL_INTERVAL,
        }]
    );

    let (state, effects) = polled(
        state,
        Ok(status(JobStatus::Processing, 0.3)),
        t0.after(Duration::from_secs(1)),
    );
    assert_eq!(effects.len(), 1);
    assert_eq!(state.live().unwrap().progress, 0.3);
    assert!(state.history().is_empty());
}

#[test]
fn first_poll_completed_commits_exactly_one_record() {
    let t0 = Stamp::now();
    let state = running_job(t0);
    let done_at = t0.after(Duration::from_millis(400));

    let (state, effects) = polled(state, Ok(status(JobStatus::Completed, 1.0)), done_at);

    let records = state.history().records().to_vec();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, TerminalStatus::Completed);
    assert_eq!(records[0].result_file_name.as_deref(), Some("out.xlsx"));
    assert_eq!(records[0].error_message, None);
    assert_eq!(records[0].cbx_file_name.as_deref(), Some("cbx.csv"));
    assert_eq!(records[0].hc_file_name.as_deref(), Some("hc.csv"));
    assert_eq!(records[0].timestamp, done_at.wall);
    assert_eq!(effects, vec![Effect::PersistHistory { records }]);

    let view = state.view();
    assert_eq!(view.stats.total_jobs, 1);
    assert_eq!(view.stats.successful_jobs, 1);
    assert_eq!(view.success_rate, 100);
    assert!(view.can_download);
    assert_eq!(view.log.last().unwrap().message, "Job completed!");
    assert_eq!(view.log.last().unwrap().level, LogLevel::Success);

    // A duplicate terminal observation is ignored.
    let (state, effects) = polled(
        state,
        Ok(status(JobStatus::Completed, 1.0)),
        t0.after(Duration::from_secs(2)),
    );
    assert!(effects.is_empty());
    assert_eq!(state.history().len(), 1);
}

#[test]
fn processing_then_failed_records_server_error() {
    let t0 = Stamp::now();
    let state = running_job(t0);

    let (state, _) = polled(state, Ok(status(JobStatus::Processing, 0.1)), t0);
    let (state, _) = polled(
        state,
        Ok(status(JobStatus::Processing, 0.5)),
        t0.after(Duration::from_secs(1)),
    );
    let (state, effects) = polled(
        state,
        Ok(status(JobStatus::Failed, 0.5)),
        t0.after(Duration::from_secs(2)),
    );

    assert_eq!(effects.len(), 1);
    let record = &state.history().records()[0];
    assert_eq!(record.status, TerminalStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("bad header"));
    assert_eq!(record.result_file_name, None);
    assert_eq!(record.processing_time, Some(2));

    let view = state.view();
    assert_eq!(view.error.as_deref(), Some("bad header"));
    assert!(!view.in_flight);
    assert!(!view.can_download);
    let last = view.log.last().unwrap();
    assert_eq!(last.level, LogLevel::Error);
    assert_eq!(last.message, "Job failed: bad header");
}

#[test]
fn transport_error_during_poll_is_a_terminal_failure() {
    let t0 = Stamp::now();
    let state = running_job(t0);

    let (state, effects) = polled(
        state,
        Err("Failed to fetch status".to_string()),
        t0.after(Duration::from_secs(5)),
    );

    assert!(matches!(effects.as_slice(), [Effect::PersistHistory { .. }]));
    let record = &state.history().records()[0];
    assert_eq!(record.status, TerminalStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("Failed to fetch status"));
    assert_eq!(record.processing_time, Some(5));
    assert_eq!(state.live().unwrap().status, JobStatus::Failed);
    assert_eq!(
        state.log().latest().unwrap().message,
        "Error: Failed to fetch status"
    );
}

#[test]
fn elapsed_time_uses_wall_clock_not_ticks() {
    let t0 = Stamp::now();
    let state = running_job(t0);

    // Only one of three display ticks arrives.
    let (state, _) = update(state, Msg::Tick, t0.after(Duration::from_secs(1)));
    assert_eq!(state.view().elapsed_secs, 1);

    let (state, _) = polled(
        state,
        Ok(status(JobStatus::Completed, 1.0)),
        t0.after(Duration::from_millis(3_050)),
    );
    assert_eq!(state.history().records()[0].processing_time, Some(3));
    assert_eq!(state.view().elapsed_secs, 3);

    // The frozen value no longer moves.
    let (state, _) = update(state, Msg::Tick, t0.after(Duration::from_secs(9)));
    assert_eq!(state.view().elapsed_secs, 3);
}

#[test]
fn observation_for_another_job_is_ignored() {
    let t0 = Stamp::now();
    let state = running_job(t0);
    let (state, effects) = update(
        state,
        Msg::StatusPolled {
            job_id: "stale-job".to_string(),
            result: Ok(status(JobStatus::Completed, 1.0)),
        },
        t0,
    );

    assert!(effects.is_empty());
    assert!(state.history().is_empty());
    assert!(state.is_in_flight());
}

#[test]
fn late_poll_after_reset_is_suppressed() {
    let t0 = Stamp::now();
    let state = running_job(t0);
    let (state, _) = polled(state, Ok(status(JobStatus::Processing, 0.2)), t0);
    let (state, _) = update(state, Msg::ResetClicked, t0.after(Duration::from_millis(500)));

    let (state, effects) = polled(
        state,
        Ok(status(JobStatus::Completed, 1.0)),
        t0.after(Duration::from_secs(1)),
    );
    assert!(effects.is_empty());
    assert!(state.history().is_empty());
    assert!(state.live().is_none());
}

#[test]
fn terminal_submission_response_commits_without_polling() {
    let t0 = Stamp::now();
    let (state, _) = update(
        AppState::new(),
        Msg::StartRequested {
            cbx: Some(FileRef::new("cbx.csv", None)),
            hc: Some(FileRef::new("hc.csv", None)),
            thresholds: None,
        },
        t0,
    );
    let (state, effects) = update(
        state,
        Msg::SubmitAccepted(status(JobStatus::Completed, 1.0)),
        t0.after(Duration::from_secs(1)),
    );

    assert!(matches!(effects.as_slice(), [Effect::PersistHistory { .. }]));
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.live().unwrap().status, JobStatus::Completed);
}

#[test]
fn download_is_only_offered_for_completed_job() {
    let t0 = Stamp::now();
    let state = running_job(t0);

    let (state, effects) = update(
        state,
        Msg::DownloadRequested {
            job_id: JOB.to_string(),
        },
        t0,
    );
    assert!(effects.is_empty());
    assert_eq!(state.log().latest().unwrap().level, LogLevel::Error);

    let (state, _) = polled(state, Ok(status(JobStatus::Completed, 1.0)), t0);
    let (state, effects) = update(
        state,
        Msg::DownloadRequested {
            job_id: JOB.to_string(),
        },
        t0,
    );
    assert_eq!(
        effects,
        vec![Effect::DownloadResult {
            job_id: JOB.to_string(),
            file_name: "out.xlsx".to_string(),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::DownloadFinished {
            job_id: JOB.to_string(),
            result: Err("Download failed".to_string()),
        },
        t0,
    );
    assert!(effects.is_empty());
    assert_eq!(state.live().unwrap().status, JobStatus::Completed);
    assert_eq!(
        state.log().latest().unwrap().message,
        "Download failed: Download failed"
    );
}

#[test]
fn download_without_result_name_uses_default() {
    let t0 = Stamp::now();
    let state = running_job(t0);
    let done = LiveJobStatus::new(JOB, JobStatus::Completed, 1.0, "Done!", "", None, None);
    let (state, _) = polled(state, Ok(done), t0);

    let (_state, effects) = update(
        state,
        Msg::DownloadRequested {
            job_id: JOB.to_string(),
        },
        t0,
    );
    assert_eq!(
        effects,
        vec![Effect::DownloadResult {
            job_id: JOB.to_string(),
            file_name: "results.xlsx".to_string(),
        }]
    );
}
