use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use dropout_validate::data::sample::RawSample;

/// Write a synthetic raw student dataset shaped like the real export
#[derive(Parser, Debug)]
#[command(name = "generate-sample")]
struct Args {
    /// Output file (semicolon-delimited, raw header)
    #[arg(long, default_value = "data/raw/data.csv")]
    output: PathBuf,

    /// Number of rows to generate
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let sample = RawSample::generate(args.rows, args.seed);
    sample.write(&args.output)?;

    println!(
        "Wrote {} rows ({} columns) to {}",
        sample.rows.len(),
        sample.header.len(),
        args.output.display()
    );
    Ok(())
}
