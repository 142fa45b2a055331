use crate::utils::constants::{DEFAULT_DATABASE, DEFAULT_WX_DIR, DEFAULT_YIELD_FILE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cropwx-pipeline")]
#[command(about = "Weather and crop-yield ingestion pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Suppress progress output")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: weather ingestion, yield ingestion, aggregation
    Run {
        #[arg(long, default_value = DEFAULT_WX_DIR, help = "Directory of per-station weather files")]
        wx_dir: PathBuf,

        #[arg(long, default_value = DEFAULT_YIELD_FILE, help = "Annual yield source file")]
        yield_file: PathBuf,

        #[arg(short, long, default_value = DEFAULT_DATABASE, help = "SQLite database path")]
        database: PathBuf,

        #[arg(long, default_value_t = num_cpus::get(), help = "Worker pool size for weather ingestion")]
        max_workers: usize,
    },

    /// Recompute yearly statistics from already-ingested observations
    Recompute {
        #[arg(short, long, default_value = DEFAULT_DATABASE)]
        database: PathBuf,
    },

    /// Show table counts and a sample of stored rows
    Info {
        #[arg(short, long, default_value = DEFAULT_DATABASE)]
        database: PathBuf,

        #[arg(short, long, default_value = "10", help = "Rows to sample per table")]
        sample: usize,

        #[arg(long, help = "Restrict the sample to one station")]
        station_id: Option<String>,

        #[arg(long, help = "Emit the sample as JSON")]
        json: bool,
    },
}
