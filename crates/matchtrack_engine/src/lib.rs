//! Matchtrack engine: service IO, history storage and effect execution.
mod client;
mod clock;
mod controller;
mod filename;
mod persist;
mod poller;
mod storage;
mod types;

pub use client::{MatchService, ReqwestMatchService, ServiceSettings, DEFAULT_BASE_URL};
pub use clock::{Clock, TokioClock};
pub use controller::{DownloadError, JobController, TrackerConfig, DISPLAY_TICK};
pub use filename::result_file_name;
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poller::PollScheduler;
pub use storage::{
    decode_history, encode_history, FileHistoryStorage, HistoryStorage, MemoryHistoryStorage,
    StorageError, DEFAULT_HISTORY_SLOT, HISTORY_SCHEMA_VERSION,
};
pub use types::{FailureKind, HealthReport, ServiceError, SubmitRequest};
