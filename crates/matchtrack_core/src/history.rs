use crate::{JobRecord, TerminalStatus};

/// Maximum number of records kept in history.
pub const HISTORY_LIMIT: usize = 50;

/// Aggregates derived from the retained history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub total_jobs: usize,
    pub successful_jobs: usize,
    pub failed_jobs: usize,
    /// Seconds. Sum of every recorded processing time divided by the number
    /// of successful jobs (at least one), so failed runs inflate it.
    pub average_time: f64,
}

impl Stats {
    pub fn compute(history: &[JobRecord]) -> Self {
        let successful_jobs = history
            .iter()
            .filter(|record| record.status == TerminalStatus::Completed)
            .count();
        let failed_jobs = history
            .iter()
            .filter(|record| record.status == TerminalStatus::Failed)
            .count();
        let total_time: u64 = history
            .iter()
            .filter_map(|record| record.processing_time)
            .sum();

        Self {
            total_jobs: history.len(),
            successful_jobs,
            failed_jobs,
            average_time: total_time as f64 / successful_jobs.max(1) as f64,
        }
    }

    /// Whole-percent share of successful jobs; 0 for an empty history.
    pub fn success_rate(&self) -> u32 {
        if self.total_jobs == 0 {
            return 0;
        }
        (self.successful_jobs as f64 / self.total_jobs as f64 * 100.0).round() as u32
    }
}

/// Most-recent-first job history with its stats kept in step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History {
    records: Vec<JobRecord>,
    stats: Stats,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with records read from storage.
    pub fn hydrate(&mut self, mut records: Vec<JobRecord>) {
        records.truncate(HISTORY_LIMIT);
        self.records = records;
        self.recompute();
    }

    /// Prepends `record` and drops whatever falls past the limit.
    pub fn commit(&mut self, record: JobRecord) {
        self.records.insert(0, record);
        self.records.truncate(HISTORY_LIMIT);
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.recompute();
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_job(&self, job_id: &str) -> bool {
        self.records.iter().any(|record| record.job_id == job_id)
    }

    fn recompute(&mut self) {
        self.stats = Stats::compute(&self.records);
    }
}
