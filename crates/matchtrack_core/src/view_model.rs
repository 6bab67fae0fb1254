use crate::{JobRecord, LiveJobStatus, LogEntry, Stats};

/// Everything a presentation layer needs to draw the tracker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub live: Option<LiveJobStatus>,
    pub in_flight: bool,
    pub can_download: bool,
    pub elapsed_secs: u64,
    pub error: Option<String>,
    pub stats: Stats,
    pub success_rate: u32,
    pub last_job: Option<JobRecord>,
    /// Most recent first.
    pub history: Vec<JobRecord>,
    /// Most recent entries, oldest first.
    pub log: Vec<LogEntry>,
    pub dirty: bool,
}
