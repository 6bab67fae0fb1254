use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Submit CBX/HC exports to the matching service and track the jobs.
#[derive(Parser, Debug)]
#[command(name = "matchtrack", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (RON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Matching service base URL (e.g., http://localhost:8000)
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// Also write the process log to the terminal at debug level
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a matching job and follow it until it finishes
    Run(RunArgs),
    /// Print statistics and the recorded job history
    History,
    /// Delete the recorded job history
    ClearHistory,
    /// Query the service health endpoint
    Health,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// CBX export file
    #[arg(long)]
    pub cbx: PathBuf,

    /// HC export file
    #[arg(long)]
    pub hc: PathBuf,

    /// Minimum company-name similarity (0-100)
    #[arg(long)]
    pub min_company_ratio: Option<u32>,

    /// Minimum address similarity (0-100)
    #[arg(long)]
    pub min_address_ratio: Option<u32>,

    /// Save the result file once the job completes
    #[arg(long, default_value_t = false)]
    pub download: bool,
}
