use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dropout_validate::ValidationError;
use dropout_validate::data::split::{DEFAULT_SEED, DEFAULT_TRAIN_FRACTION};
use dropout_validate::pipeline::{self, PipelineConfig};
use dropout_validate::validate::correlation::DEFAULT_THRESHOLD;
use dropout_validate::validate::{FailurePolicy, PipelinePolicy};

/// Clean, validate and split the student dropout dataset
#[derive(Parser, Debug)]
#[command(name = "dropout-validate")]
#[command(version)]
struct Args {
    /// Path of the raw, semicolon-delimited data file
    #[arg(long, env = "DROPOUT_RAW_PATH")]
    file_path: PathBuf,

    /// Directory for the cleaned table and the train/test split
    #[arg(long, default_value = "data/processed", env = "DROPOUT_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Seed of the train/test shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Share of rows in the training table
    #[arg(long, default_value_t = DEFAULT_TRAIN_FRACTION)]
    train_fraction: f64,

    /// Largest allowed absolute correlation between two columns
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    corr_threshold: f64,

    /// Stop schema validation at its first violation
    #[arg(long)]
    fail_fast: bool,

    /// Run every validator even after one fails
    #[arg(long)]
    collect_all: bool,

    /// Write a JSON report of all validator outcomes to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl From<Args> for PipelineConfig {
    fn from(args: Args) -> Self {
        let mut config = PipelineConfig::new(args.file_path, args.output_dir);
        config.seed = args.seed;
        config.train_fraction = args.train_fraction;
        config.corr_threshold = args.corr_threshold;
        if args.fail_fast {
            config.schema_policy = FailurePolicy::FailFast;
        }
        if args.collect_all {
            config.pipeline_policy = PipelinePolicy::CollectAll;
        }
        config.report_path = args.report;
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::from(Args::parse());

    match pipeline::run(&config) {
        Ok(output) => {
            log::info!(
                "Pipeline finished: {} training rows, {} test rows",
                output.train_rows,
                output.test_rows
            );
            ExitCode::SUCCESS
        }
        Err(e) if e.downcast_ref::<ValidationError>().is_some() => {
            log::error!("Data validation failed, aborting before the split");
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("Pipeline failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
