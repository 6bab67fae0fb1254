use std::time::Instant;

/// Wall-clock duration of the tracked job.
///
/// The value is always derived from the start instant; display ticks only
/// refresh the cached seconds shown between observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElapsedTimer {
    started_at: Option<Instant>,
    stopped_at: Option<Instant>,
    displayed_secs: u64,
}

impl ElapsedTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.stopped_at = None;
        self.displayed_secs = 0;
    }

    /// Display tick. Ignored unless the timer is running.
    pub fn refresh(&mut self, now: Instant) {
        if self.is_running() {
            self.displayed_secs = self.elapsed_secs(now);
        }
    }

    /// Freezes the timer and returns the final whole seconds.
    pub fn stop(&mut self, now: Instant) -> u64 {
        if self.is_running() {
            self.stopped_at = Some(now);
        }
        self.displayed_secs = self.elapsed_secs(now);
        self.displayed_secs
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        let Some(start) = self.started_at else {
            return 0;
        };
        let end = self.stopped_at.unwrap_or(now);
        end.saturating_duration_since(start).as_secs()
    }

    pub fn displayed_secs(&self) -> u64 {
        self.displayed_secs
    }
}

/// `m:ss` rendering of a second count.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
