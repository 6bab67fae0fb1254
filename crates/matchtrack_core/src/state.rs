use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::activity_log::LOG_DISPLAY_LIMIT;
use crate::view_model::AppViewModel;
use crate::{
    ActivityLog, ElapsedTimer, History, JobRecord, JobStatus, LiveJobStatus, LogLevel, StartError,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    live: Option<LiveJobStatus>,
    cbx_name: Option<String>,
    hc_name: Option<String>,
    /// A record has already been committed for the live job.
    committed: bool,
    timer: ElapsedTimer,
    error: Option<String>,
    start_error: Option<StartError>,
    log: ActivityLog,
    history: History,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let history = self.history.records().to_vec();
        let stats = self.history.stats();
        AppViewModel {
            live: self.live.clone(),
            in_flight: self.is_in_flight(),
            can_download: self.downloadable_job().is_some(),
            elapsed_secs: self.timer.displayed_secs(),
            error: self.error.clone(),
            stats,
            success_rate: stats.success_rate(),
            last_job: history.first().cloned(),
            history,
            log: self.log.recent_chronological(LOG_DISPLAY_LIMIT),
            dirty: self.dirty,
        }
    }

    pub fn live(&self) -> Option<&LiveJobStatus> {
        self.live.as_ref()
    }

    pub fn live_job_id(&self) -> Option<&str> {
        self.live.as_ref().and_then(|live| live.job_id.as_deref())
    }

    /// A job has been submitted and has not reached a terminal status.
    pub fn is_in_flight(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| !live.status.is_terminal())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn timer(&self) -> &ElapsedTimer {
        &self.timer
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Why the last start request was refused, if it was.
    pub fn take_start_error(&mut self) -> Option<StartError> {
        self.start_error.take()
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn downloadable_job(&self) -> Option<&LiveJobStatus> {
        self.live
            .as_ref()
            .filter(|live| live.status == JobStatus::Completed && live.job_id.is_some())
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn push_log(&mut self, level: LogLevel, message: impl Into<String>, at: DateTime<Utc>) {
        self.log.push(level, message, at);
        self.dirty = true;
    }

    pub(crate) fn begin_submission(
        &mut self,
        live: LiveJobStatus,
        cbx_name: String,
        hc_name: String,
        now: Instant,
    ) {
        self.live = Some(live);
        self.cbx_name = Some(cbx_name);
        self.hc_name = Some(hc_name);
        self.committed = false;
        self.error = None;
        self.start_error = None;
        self.timer.start(now);
        self.dirty = true;
    }

    /// The placeholder shown while the upload is in flight.
    pub(crate) fn is_uploading(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.job_id.is_none() && !live.status.is_terminal())
    }

    /// True when an observation for `job_id` may still change the live job.
    pub(crate) fn accepts_observation(&self, job_id: &str) -> bool {
        !self.committed && self.is_in_flight() && self.live_job_id() == Some(job_id)
    }

    pub(crate) fn set_live(&mut self, live: LiveJobStatus) {
        self.live = Some(live);
        self.dirty = true;
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.dirty = true;
    }

    pub(crate) fn set_start_error(&mut self, error: StartError) {
        self.start_error = Some(error);
    }

    pub(crate) fn abandon_submission(&mut self) {
        self.live = None;
        self.timer.reset();
        self.dirty = true;
    }

    pub(crate) fn refresh_timer(&mut self, now: Instant) {
        let before = self.timer.displayed_secs();
        self.timer.refresh(now);
        if self.timer.displayed_secs() != before {
            self.dirty = true;
        }
    }

    pub(crate) fn stop_timer(&mut self, now: Instant) -> u64 {
        self.timer.stop(now)
    }

    /// Commits the terminal record of the live job. Later calls for the same
    /// lifecycle are ignored.
    pub(crate) fn commit_record(&mut self, record: JobRecord) -> bool {
        if self.committed {
            return false;
        }
        let record = record.with_file_names(self.cbx_name.clone(), self.hc_name.clone());
        self.history.commit(record);
        self.committed = true;
        self.dirty = true;
        true
    }

    pub(crate) fn reset_live(&mut self) {
        self.live = None;
        self.cbx_name = None;
        self.hc_name = None;
        self.committed = false;
        self.error = None;
        self.start_error = None;
        self.timer.reset();
        self.dirty = true;
    }

    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
        self.dirty = true;
    }

    pub(crate) fn clear_history(&mut self) {
        self.history.clear();
        self.dirty = true;
    }

    pub(crate) fn hydrate_history(&mut self, records: Vec<JobRecord>) {
        self.history.hydrate(records);
        self.dirty = true;
    }
}
