//! Plain-text rendering of the tracker view for the terminal.
use chrono::Local;
use matchtrack_core::{
    format_elapsed, short_id, AppViewModel, JobRecord, JobStatus, LiveJobStatus, LogEntry, LogLevel,
    Stats, TerminalStatus,
};

/// One progress line for the live job, e.g.
/// `[processing]  45%  0:03  Matching companies...`.
pub fn progress_line(live: &LiveJobStatus, elapsed_secs: u64) -> String {
    let percent = (live.progress * 100.0).round() as u32;
    format!(
        "[{}] {:>3}%  {}  {}",
        live.status,
        percent,
        format_elapsed(elapsed_secs),
        live.message
    )
}

pub fn final_summary(view: &AppViewModel) -> String {
    let Some(live) = &view.live else {
        return "No job".to_string();
    };
    let id = live
        .job_id
        .as_deref()
        .map(short_id)
        .unwrap_or_else(|| "-".to_string());
    let elapsed = format_elapsed(view.elapsed_secs);
    match live.status {
        JobStatus::Completed => format!(
            "Job {id} completed in {elapsed}: {}",
            live.result_file_name.as_deref().unwrap_or("no result file")
        ),
        JobStatus::Failed => {
            format!("Job {id} failed after {elapsed}: {}", live.failure_text())
        }
        status => format!("Job {id} {status} ({elapsed})"),
    }
}

pub fn stats_lines(stats: &Stats) -> Vec<String> {
    vec![
        format!("Total jobs:    {}", stats.total_jobs),
        format!("Successful:    {}", stats.successful_jobs),
        format!("Failed:        {}", stats.failed_jobs),
        format!("Success rate:  {}%", stats.success_rate()),
        format!("Average time:  {:.1}s", stats.average_time),
    ]
}

pub fn history_table(records: &[JobRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No jobs yet".to_string()];
    }
    let mut lines = vec![format!(
        "{:<10} {:<9} {:<16} {:>6}  {}",
        "JOB", "STATUS", "WHEN", "TIME", "DETAIL"
    )];
    for record in records {
        let status = match record.status {
            TerminalStatus::Completed => "completed",
            TerminalStatus::Failed => "failed",
        };
        let time = record
            .processing_time
            .map(format_elapsed)
            .unwrap_or_else(|| "-".to_string());
        let detail = match record.status {
            TerminalStatus::Completed => record.result_file_name.clone(),
            TerminalStatus::Failed => record.error_message.clone(),
        }
        .unwrap_or_default();
        lines.push(format!(
            "{:<10} {:<9} {:<16} {:>6}  {}",
            short_id(&record.job_id),
            status,
            record
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            time,
            detail
        ));
    }
    lines
}

pub fn log_line(entry: &LogEntry) -> String {
    let marker = match entry.level {
        LogLevel::Info => " ",
        LogLevel::Success => "+",
        LogLevel::Error => "!",
    };
    format!(
        "{} {} {}",
        entry.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        marker,
        entry.message
    )
}
