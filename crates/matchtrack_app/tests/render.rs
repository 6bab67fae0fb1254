use chrono::Utc;
use matchtrack_app::render::{final_summary, history_table, progress_line, stats_lines};
use matchtrack_core::{AppViewModel, JobRecord, JobStatus, LiveJobStatus, Stats};
use pretty_assertions::assert_eq;

fn live(status: JobStatus, progress: f64) -> LiveJobStatus {
    LiveJobStatus::new(
        "9c1d7a42-5e0b",
        status,
        progress,
        "Matching companies...",
        "2026-10-19T08:00:00",
        (status == JobStatus::Completed).then(|| "out.xlsx".to_string()),
        (status == JobStatus::Failed).then(|| "bad header".to_string()),
    )
}

#[test]
fn progress_line_shows_percent_and_elapsed() {
    assert_eq!(
        progress_line(&live(JobStatus::Processing, 0.45), 63),
        "[processing]  45%  1:03  Matching companies..."
    );
}

#[test]
fn summary_names_result_or_error() {
    let mut view = AppViewModel {
        live: Some(live(JobStatus::Completed, 1.0)),
        elapsed_secs: 12,
        ..AppViewModel::default()
    };
    assert_eq!(final_summary(&view), "Job 9c1d7a42 completed in 0:12: out.xlsx");

    view.live = Some(live(JobStatus::Failed, 0.5));
    assert_eq!(final_summary(&view), "Job 9c1d7a42 failed after 0:12: bad header");

    view.live = None;
    assert_eq!(final_summary(&view), "No job");
}

#[test]
fn stats_lines_include_rate_and_average() {
    let records = vec![
        JobRecord::completed("a", Utc::now(), 10, None),
        JobRecord::failed("b", Utc::now(), 5, "bad header"),
    ];
    let lines = stats_lines(&Stats::compute(&records));
    assert_eq!(lines[0], "Total jobs:    2");
    assert_eq!(lines[3], "Success rate:  50%");
    assert_eq!(lines[4], "Average time:  15.0s");
}

#[test]
fn history_table_lists_newest_first() {
    let records = vec![
        JobRecord::failed("job-bbbbbbbb-2", Utc::now(), 5, "bad header"),
        JobRecord::completed("job-aaaaaaaa-1", Utc::now(), 65, Some("out.xlsx".into())),
    ];
    let lines = history_table(&records);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("job-bbbb"));
    assert!(lines[1].ends_with("bad header"));
    assert!(lines[2].contains("1:05"));
    assert!(lines[2].ends_with("out.xlsx"));

    assert_eq!(history_table(&[]), vec!["No jobs yet".to_string()]);
}
