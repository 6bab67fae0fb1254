use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use matchtrack_core::{
    update, AppState, AppViewModel, Effect, FileRef, JobHandle, JobId, LiveJobStatus, LogLevel,
    Msg, StartError, Thresholds,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use track_logging::{track_error, track_info, track_warn};

use crate::filename::result_file_name;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{Clock, HealthReport, HistoryStorage, MatchService, PollScheduler, ServiceError, SubmitRequest, TokioClock};

/// Refresh period of the elapsed-time display.
pub const DISPLAY_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Where downloaded result files are saved.
    pub output_dir: PathBuf,
    /// Sent with every submission that does not bring its own thresholds.
    pub default_thresholds: Option<Thresholds>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            default_thresholds: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("job {0} has no completed result")]
    NotReady(JobId),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Drives one tracked job at a time: owns the core state, runs its effects
/// and feeds poll results back in.
///
/// All state changes happen on the task that owns the controller; spawned
/// poll tasks only report over a channel.
pub struct JobController {
    config: TrackerConfig,
    state: AppState,
    service: Arc<dyn MatchService>,
    storage: Box<dyn HistoryStorage>,
    clock: Arc<dyn Clock>,
    polls: PollScheduler,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    mirrored_log_id: u64,
}

impl JobController {
    pub fn new(
        config: TrackerConfig,
        service: Arc<dyn MatchService>,
        storage: Box<dyn HistoryStorage>,
    ) -> Self {
        Self::with_clock(config, service, storage, Arc::new(TokioClock))
    }

    /// Builds the controller and hydrates history from `storage`.
    pub fn with_clock(
        config: TrackerConfig,
        service: Arc<dyn MatchService>,
        storage: Box<dyn HistoryStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let records = match storage.load() {
            Ok(records) => records,
            Err(err) => {
                track_warn!("Starting with empty history, stored history unreadable: {}", err);
                Vec::new()
            }
        };

        let mut controller = Self {
            config,
            state: AppState::new(),
            service,
            storage,
            clock,
            polls: PollScheduler::new(),
            msg_tx,
            msg_rx,
            mirrored_log_id: 0,
        };
        let effects = controller.dispatch(Msg::HistoryLoaded(records));
        debug_assert!(effects.is_empty());
        controller
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Submits the two files and starts polling the new job.
    pub async fn start_job(
        &mut self,
        cbx: Option<FileRef>,
        hc: Option<FileRef>,
        thresholds: Option<Thresholds>,
    ) -> Result<JobHandle, StartError> {
        let thresholds = thresholds.or(self.config.default_thresholds);
        self.apply(Msg::StartRequested {
            cbx,
            hc,
            thresholds,
        })
        .await;

        if let Some(err) = self.state.take_start_error() {
            return Err(err);
        }
        match self.state.live() {
            Some(LiveJobStatus {
                job_id: Some(job_id),
                status,
                ..
            }) => Ok(JobHandle {
                job_id: job_id.clone(),
                initial_status: *status,
            }),
            _ => Err(StartError::Transport(
                "submission was not accepted".to_string(),
            )),
        }
    }

    /// Saves the result of the tracked, completed job into the output directory.
    pub async fn download(&mut self, job_id: &str) -> Result<PathBuf, DownloadError> {
        let effects = self.dispatch(Msg::DownloadRequested {
            job_id: job_id.to_string(),
        });
        let mut saved = None;
        for effect in effects {
            match effect {
                Effect::DownloadResult { job_id, file_name } => {
                    saved = Some(self.save_artifact(&job_id, &file_name).await);
                }
                other => {
                    if let Some(msg) = self.run_effect(other).await {
                        self.apply(msg).await;
                    }
                }
            }
        }

        let Some(result) = saved else {
            return Err(DownloadError::NotReady(job_id.to_string()));
        };
        let reported = match &result {
            Ok(path) => Ok(path.clone()),
            Err(err) => Err(err.to_string()),
        };
        self.apply(Msg::DownloadFinished {
            job_id: job_id.to_string(),
            result: reported,
        })
        .await;
        result
    }

    /// Drops the live job and returns to the pre-submission state.
    pub async fn reset(&mut self) {
        self.apply(Msg::ResetClicked).await;
    }

    pub async fn clear_log(&mut self) {
        self.apply(Msg::ClearLogClicked).await;
    }

    pub async fn clear_history(&mut self) {
        self.apply(Msg::ClearHistoryClicked).await;
    }

    pub async fn health(&self) -> Result<HealthReport, ServiceError> {
        self.service.health().await
    }

    /// Handles every event that is already waiting. Returns how many there were.
    pub async fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.apply(msg).await;
            handled += 1;
        }
        handled
    }

    /// Waits for the next poll result and handles it.
    ///
    /// Only call this while a poll is scheduled; otherwise it waits forever.
    pub async fn process_next(&mut self) {
        if let Some(msg) = self.msg_rx.recv().await {
            self.apply(msg).await;
        }
    }

    /// Runs display ticks and poll results until the live job is terminal or
    /// gone, calling `on_update` whenever the view changed.
    pub async fn run_until_settled<F>(&mut self, mut on_update: F) -> Option<LiveJobStatus>
    where
        F: FnMut(&AppViewModel),
    {
        let mut ticker = tokio::time::interval(DISPLAY_TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.state.is_in_flight() {
            let next = tokio::select! {
                msg = self.msg_rx.recv() => msg,
                _ = ticker.tick() => Some(Msg::Tick),
            };
            if let Some(msg) = next {
                self.apply(msg).await;
            }
            if self.state.consume_dirty() {
                on_update(&self.state.view());
            }
        }
        self.state.live().cloned()
    }

    /// Applies `msg` and every message its effects produce, in order.
    async fn apply(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            for effect in self.dispatch(msg) {
                if let Some(next) = self.run_effect(effect).await {
                    queue.push_back(next);
                }
            }
        }
        let active = if self.state.is_in_flight() {
            self.state.live_job_id()
        } else {
            None
        };
        self.polls.retain_only(active);
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let now = self.clock.now();
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg, now);
        self.state = state;
        self.mirror_activity();
        effects
    }

    async fn run_effect(&mut self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::SubmitJob {
                cbx,
                hc,
                thresholds,
            } => {
                let request = SubmitRequest {
                    cbx,
                    hc,
                    thresholds,
                };
                match self.service.submit(&request).await {
                    Ok(status) => Some(Msg::SubmitAccepted(status)),
                    Err(err) => {
                        track_warn!("Submission failed ({}): {}", err.kind, err.message);
                        Some(Msg::SubmitFailed {
                            message: err.message,
                        })
                    }
                }
            }
            Effect::SchedulePoll { job_id, delay } => {
                self.polls.schedule(
                    job_id,
                    delay,
                    self.service.clone(),
                    self.msg_tx.clone(),
                );
                None
            }
            Effect::CancelPolling { job_id } => {
                self.polls.cancel(&job_id);
                None
            }
            Effect::PersistHistory { records } => match self.storage.save(&records) {
                Ok(()) => None,
                Err(err) => {
                    track_error!("Failed to persist {} history records: {}", records.len(), err);
                    Some(Msg::HistorySaveFailed {
                        message: err.to_string(),
                    })
                }
            },
            Effect::ClearStoredHistory => match self.storage.clear() {
                Ok(()) => None,
                Err(err) => {
                    track_error!("Failed to clear stored history: {}", err);
                    Some(Msg::HistorySaveFailed {
                        message: err.to_string(),
                    })
                }
            },
            Effect::DownloadResult { job_id, file_name } => {
                let result = self
                    .save_artifact(&job_id, &file_name)
                    .await
                    .map_err(|err| err.to_string());
                Some(Msg::DownloadFinished { job_id, result })
            }
        }
    }

    async fn save_artifact(&self, job_id: &str, file_name: &str) -> Result<PathBuf, DownloadError> {
        let bytes = self.service.download(job_id).await?;
        let writer = AtomicFileWriter::new(self.config.output_dir.clone());
        let path = writer.write(&result_file_name(Some(file_name)), &bytes)?;
        track_info!("Saved result of job {} to {:?}", job_id, path);
        Ok(path)
    }

    /// Forwards activity entries added since the last call to the process log.
    fn mirror_activity(&mut self) {
        let fresh: Vec<_> = self
            .state
            .log()
            .entries()
            .take_while(|entry| entry.id > self.mirrored_log_id)
            .collect();
        for entry in fresh.iter().rev() {
            match entry.level {
                LogLevel::Error => track_warn!("{}", entry.message),
                LogLevel::Info | LogLevel::Success => track_info!("{}", entry.message),
            }
        }
        if let Some(latest) = self.state.log().latest() {
            self.mirrored_log_id = latest.id;
        }
    }
}
