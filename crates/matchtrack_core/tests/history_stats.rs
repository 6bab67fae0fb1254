use chrono::{TimeZone, Utc};
use matchtrack_core::{History, JobRecord, Stats, TerminalStatus, HISTORY_LIMIT};
use pretty_assertions::assert_eq;

fn completed(n: usize, secs: u64) -> JobRecord {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(n as i64);
    JobRecord::completed(format!("job-{n}"), at, secs, Some(format!("out-{n}.xlsx")))
}

fn failed(n: usize, secs: u64) -> JobRecord {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(n as i64);
    JobRecord::failed(format!("job-{n}"), at, secs, "bad header")
}

#[test]
fn history_is_capped_and_most_recent_first() {
    let mut history = History::new();
    for n in 0..(HISTORY_LIMIT + 17) {
        history.commit(if n % 3 == 0 { failed(n, 1) } else { completed(n, 2) });
        assert!(history.len() <= HISTORY_LIMIT);
        assert_eq!(history.stats().total_jobs, history.len());
        assert_eq!(history.records()[0].job_id, format!("job-{n}"));
    }

    let ids: Vec<_> = history.records().iter().map(|r| r.job_id.clone()).collect();
    let expected: Vec<_> = (17..(HISTORY_LIMIT + 17)).rev().map(|n| format!("job-{n}")).collect();
    assert_eq!(ids, expected);
    assert!(history
        .records()
        .windows(2)
        .all(|pair| pair[0].timestamp > pair[1].timestamp));
}

#[test]
fn hydrate_truncates_and_recomputes() {
    let records: Vec<_> = (0..60).rev().map(|n| completed(n, 4)).collect();
    let mut history = History::new();
    history.hydrate(records);

    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history.records()[0].job_id, "job-59");
    assert_eq!(history.stats().total_jobs, HISTORY_LIMIT);
    assert_eq!(history.stats().successful_jobs, HISTORY_LIMIT);
    assert_eq!(history.stats().average_time, 4.0);
}

#[test]
fn stats_of_empty_history_do_not_divide_by_zero() {
    let stats = Stats::compute(&[]);
    assert_eq!(stats, Stats::default());
    assert_eq!(stats.success_rate(), 0);
    assert_eq!(stats.average_time, 0.0);
}

#[test]
fn average_time_counts_failed_runs_over_successful_denominator() {
    let history = vec![completed(1, 10), completed(2, 20), failed(3, 30)];
    let stats = Stats::compute(&history);

    assert_eq!(stats.total_jobs, 3);
    assert_eq!(stats.successful_jobs, 2);
    assert_eq!(stats.failed_jobs, 1);
    // (10 + 20 + 30) / max(2, 1)
    assert_eq!(stats.average_time, 30.0);
    assert_eq!(stats.success_rate(), 67);
}

#[test]
fn average_time_with_only_failures_divides_by_one() {
    let stats = Stats::compute(&[failed(1, 7), failed(2, 5)]);
    assert_eq!(stats.successful_jobs, 0);
    assert_eq!(stats.average_time, 12.0);
    assert_eq!(stats.success_rate(), 0);
}

#[test]
fn records_without_processing_time_are_skipped_in_sum() {
    let mut legacy = completed(1, 0);
    legacy.processing_time = None;
    let stats = Stats::compute(&[legacy, completed(2, 8)]);
    assert_eq!(stats.average_time, 4.0);
}

#[test]
fn clear_resets_stats() {
    let mut history = History::new();
    history.commit(completed(1, 3));
    history.commit(failed(2, 3));
    history.clear();

    assert!(history.is_empty());
    assert_eq!(history.stats(), Stats::default());
}

#[test]
fn terminal_status_is_preserved_on_commit() {
    let mut history = History::new();
    history.commit(failed(1, 2));
    assert_eq!(history.records()[0].status, TerminalStatus::Failed);
    assert!(history.contains_job("job-1"));
    assert!(!history.contains_job("job-2"));
}
