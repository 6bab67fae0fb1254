use chrono::Utc;
use matchtrack_core::Stamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Stamp;
}

/// Monotonic time from the tokio timer, so paused test runtimes control
/// elapsed durations as well as the poll schedule.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Stamp {
        Stamp::new(tokio::time::Instant::now().into_std(), Utc::now())
    }
}
