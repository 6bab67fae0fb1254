//! Matchtrack core: pure job-lifecycle state machine and view-model helpers.
mod activity_log;
mod effect;
mod error;
mod history;
mod model;
mod msg;
mod state;
mod timer;
mod update;
mod view_model;

pub use activity_log::{ActivityLog, LogEntry, LogLevel, LOG_DISPLAY_LIMIT};
pub use effect::{Effect, DEFAULT_RESULT_FILE_NAME, POLL_INTERVAL};
pub use error::{InputSlot, StartError, ValidationError};
pub use history::{History, Stats, HISTORY_LIMIT};
pub use model::{
    FileRef, JobHandle, JobId, JobRecord, JobStatus, LiveJobStatus, Stamp, TerminalStatus,
    Thresholds, DEFAULT_RATIO,
};
pub use msg::Msg;
pub use state::AppState;
pub use timer::{format_elapsed, ElapsedTimer};
pub use update::{short_id, update};
pub use view_model::AppViewModel;
