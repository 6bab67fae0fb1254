use chrono::Utc;
use matchtrack_core::{update, AppState, Effect, JobRecord, LogLevel, Msg, Stamp};

fn init_logging() {
    track_logging::initialize_for_tests();
}

fn stored_history() -> Vec<JobRecord> {
    vec![
        JobRecord::completed("b", Utc::now(), 12, Some("b.xlsx".to_string())),
        JobRecord::failed("a", Utc::now(), 3, "bad header"),
    ]
}

#[test]
fn loaded_history_hydrates_view_and_stats() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::HistoryLoaded(stored_history()),
        Stamp::now(),
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.history.len(), 2);
    assert_eq!(view.last_job.unwrap().job_id, "b");
    assert_eq!(view.stats.total_jobs, 2);
    assert_eq!(view.stats.successful_jobs, 1);
    assert_eq!(view.stats.failed_jobs, 1);
    assert_eq!(view.success_rate, 50);
    assert_eq!(view.stats.average_time, 15.0);
}

#[test]
fn clear_history_empties_state_and_storage() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::HistoryLoaded(stored_history()),
        Stamp::now(),
    );
    let (state, effects) = update(state, Msg::ClearHistoryClicked, Stamp::now());

    assert_eq!(effects, vec![Effect::ClearStoredHistory]);
    assert!(state.history().is_empty());
    assert_eq!(state.view().stats.total_jobs, 0);
}

#[test]
fn save_failure_keeps_history_and_logs_error() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::HistoryLoaded(stored_history()),
        Stamp::now(),
    );
    let (state, effects) = update(
        state,
        Msg::HistorySaveFailed {
            message: "disk full".to_string(),
        },
        Stamp::now(),
    );

    assert!(effects.is_empty());
    assert_eq!(state.history().len(), 2);
    let latest = state.log().latest().unwrap();
    assert_eq!(latest.level, LogLevel::Error);
    assert_eq!(latest.message, "History not saved: disk full");
}
