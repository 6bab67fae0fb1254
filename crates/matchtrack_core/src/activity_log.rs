use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Number of entries a log view shows.
pub const LOG_DISPLAY_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
}

/// In-memory operator activity log, newest entry first.
///
/// Entries are only ever removed by [`ActivityLog::clear`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    next_id: u64,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry at the head and returns its id.
    pub fn push(
        &mut self,
        level: LogLevel,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push_front(LogEntry {
            id,
            timestamp,
            message: message.into(),
            level,
        });
        id
    }

    /// All entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// The most recent `limit` entries, ordered oldest to newest.
    pub fn recent_chronological(&self, limit: usize) -> Vec<LogEntry> {
        let mut recent: Vec<LogEntry> = self.entries.iter().take(limit).cloned().collect();
        recent.reverse();
        recent
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
