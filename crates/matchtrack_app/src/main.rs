use std::path::Path;

use clap::Parser;
use log::LevelFilter;
use matchtrack_app::cli::{Cli, Command};
use matchtrack_app::commands;
use matchtrack_app::config::{AppConfig, LOG_FILE};
use track_logging::LogDestination;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (destination, level) = if cli.verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    track_logging::initialize(destination, level, Path::new(LOG_FILE));

    let config = AppConfig::load(cli.config.as_deref())?.with_url(cli.url);
    match cli.command {
        Command::Run(args) => commands::run(&config, args).await,
        Command::History => commands::history(&config),
        Command::ClearHistory => commands::clear_history(&config),
        Command::Health => commands::health(&config).await,
    }
}
