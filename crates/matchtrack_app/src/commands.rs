use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::bail;
use matchtrack_core::{short_id, FileRef, History, JobStatus, Thresholds, DEFAULT_RATIO};
use matchtrack_engine::{HistoryStorage, JobController, MatchService, ReqwestMatchService};
use track_logging::{track_info, track_warn};

use crate::cli::RunArgs;
use crate::config::AppConfig;
use crate::render;

/// Thresholds to send, or `None` when neither ratio was given.
pub fn thresholds_from(
    min_company_ratio: Option<u32>,
    min_address_ratio: Option<u32>,
) -> anyhow::Result<Option<Thresholds>> {
    if min_company_ratio.is_none() && min_address_ratio.is_none() {
        return Ok(None);
    }
    let thresholds = Thresholds::new(
        min_company_ratio.unwrap_or(DEFAULT_RATIO.into()),
        min_address_ratio.unwrap_or(DEFAULT_RATIO.into()),
    )?;
    Ok(Some(thresholds))
}

pub fn input_file(path: &Path) -> FileRef {
    let size = fs::metadata(path).ok().map(|meta| meta.len());
    FileRef::new(path, size)
}

pub async fn run(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let thresholds = thresholds_from(args.min_company_ratio, args.min_address_ratio)?;
    let service = ReqwestMatchService::new(config.service_settings())?;
    let mut controller = JobController::new(
        config.tracker_config(),
        Arc::new(service),
        Box::new(config.history_storage()),
    );

    let cbx = input_file(&args.cbx);
    let hc = input_file(&args.hc);
    let handle = match controller.start_job(Some(cbx), Some(hc), thresholds).await {
        Ok(handle) => handle,
        Err(err) => {
            print_log(&controller.view());
            return Err(err.into());
        }
    };
    println!("Job {} submitted", short_id(&handle.job_id));

    let mut last_line = String::new();
    let outcome = controller
        .run_until_settled(|view| {
            if let Some(live) = &view.live {
                let line = render::progress_line(live, view.elapsed_secs);
                if line != last_line {
                    println!("{line}");
                    last_line = line;
                }
            }
        })
        .await;

    let view = controller.view();
    println!("{}", render::final_summary(&view));
    if args.download {
        if view.can_download {
            match controller.download(&handle.job_id).await {
                Ok(path) => println!("Saved {}", path.display()),
                Err(err) => eprintln!("Download failed: {err}"),
            }
        } else {
            track_warn!("Skipping download, job {} has no result", handle.job_id);
        }
    }
    print_log(&controller.view());

    match outcome {
        Some(live) if live.status == JobStatus::Failed => {
            bail!("job {} failed: {}", short_id(&handle.job_id), live.failure_text())
        }
        _ => Ok(()),
    }
}

/// Reads the stored history the way the controller hydrates it: capped at
/// the history limit, and empty when the slot cannot be decoded.
pub fn load_history(storage: &dyn HistoryStorage) -> History {
    let mut history = History::new();
    match storage.load() {
        Ok(records) => history.hydrate(records),
        Err(err) => {
            track_warn!("Stored history unreadable, showing empty history: {}", err);
            eprintln!("Warning: stored history unreadable ({err}), showing empty history");
        }
    }
    history
}

pub fn history_report(history: &History) -> Vec<String> {
    let mut lines = render::stats_lines(&history.stats());
    lines.push(String::new());
    lines.extend(render::history_table(history.records()));
    lines
}

pub fn history(config: &AppConfig) -> anyhow::Result<()> {
    let history = load_history(&config.history_storage());
    for line in history_report(&history) {
        println!("{line}");
    }
    Ok(())
}

pub fn clear_history(config: &AppConfig) -> anyhow::Result<()> {
    let storage = config.history_storage();
    storage.clear()?;
    track_info!("History cleared at {:?}", storage.path());
    println!("History cleared");
    Ok(())
}

pub async fn health(config: &AppConfig) -> anyhow::Result<()> {
    let service = ReqwestMatchService::new(config.service_settings())?;
    let report = service.health().await?;
    match report.jobs_active {
        Some(active) => println!("{}: {} ({} active jobs)", config.base_url, report.status, active),
        None => println!("{}: {}", config.base_url, report.status),
    }
    Ok(())
}

fn print_log(view: &matchtrack_core::AppViewModel) {
    println!();
    for entry in &view.log {
        println!("{}", render::log_line(entry));
    }
}
