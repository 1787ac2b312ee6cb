//! Command-line entry point for the quality scan.
//!
//! # Usage
//!
//! ```bash
//! quality-scan --dir <DIR> --recording <FILE> [OPTIONS]
//! ```
//!
//! # Arguments
//!
//! * `--dir` - Directory with the images to assess
//! * `--sdk-path` - Root of the face SDK install
//! * `--num-processed` - Number of randomly drawn images to process (0 = all)
//! * `--output` - CSV report path (default: result.csv)
//! * `--seed` - Seed for reproducible sampling
//! * `--recording` - Exported analysis results to replay
//!
//! # Example
//!
//! ```bash
//! quality-scan --dir photos/ --num-processed 200 --recording photos.json
//! ```

use clap::Parser;
use quality_scan::core::config::ConfigError;
use quality_scan::core::constants::{DEFAULT_OUTPUT_FILE, DEFAULT_SDK_PATH};
use quality_scan::prelude::*;
use quality_scan::utils::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Command-line arguments for the quality scan
#[derive(Parser)]
#[command(name = "quality-scan")]
#[command(about = "Assess face image quality over a directory and write a CSV report")]
struct Args {
    /// Directory with the images to assess
    #[arg(long)]
    dir: PathBuf,

    /// Root of the face SDK install
    #[arg(long, default_value = DEFAULT_SDK_PATH)]
    sdk_path: PathBuf,

    /// Number of randomly drawn images to process; 0 or negative processes all
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    num_processed: i64,

    /// Path of the CSV report
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Exported analysis results to replay
    #[arg(long)]
    recording: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> ScanConfig {
        let mut config = ScanConfig::new(self.dir)
            .with_sdk_path(self.sdk_path)
            .with_output(self.output)
            .with_num_processed(usize::try_from(self.num_processed).unwrap_or(0));
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(recording) = self.recording {
            config = config.with_recording(recording);
        }
        config
    }
}

fn run(config: ScanConfig) -> ScanResult<RunStats> {
    let recording = config
        .recording
        .clone()
        .ok_or(ConfigError::MissingRequired {
            name: "--recording",
        })?;

    let mut runner = BatchRunner::new(config)?;
    let layout = SdkLayout::new(&runner.config().sdk_path);
    info!(
        "Using face SDK at {} (library {}, licenses in {})",
        layout.root().display(),
        layout.library_path().display(),
        layout.license_dir().display()
    );

    let service = RecordedService::open(layout, &recording)?;
    runner.run(&service)
}

fn main() -> ExitCode {
    init_tracing();

    let config = Args::parse().into_config();
    info!("Scanning {}", config.dir.display());

    match run(config) {
        Ok(stats) => {
            info!("{stats}");
            ExitCode::SUCCESS
        }
        Err(ScanError::Engine(e)) => {
            error!("Engine error (code {:#x}): {}", e.code, e.message);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
