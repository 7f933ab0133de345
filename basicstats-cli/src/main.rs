//! basicstats
//!
//! Computes MIN, MAX, AVG and STDDEV over a file of numbers, one per line.
//! Exits 0 on success, 2 on bad arguments or configuration and 1 when the
//! job itself fails.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use basicstats::config::DEFAULT_CHUNK_SIZE;
use basicstats::logging::{init_logging, LoggingConfig};
use basicstats::merger::DEFAULT_PRECISION;
use basicstats::{run_job, JobConfig, OutputFormat, StatsError, WireFormat};
use clap::{ArgAction, Parser};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "basicstats", author, version, about, long_about = None)]
struct Args {
    /// File with one number per line
    input: PathBuf,

    /// Directory the results are written to
    output_dir: PathBuf,

    /// Records folded per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Chunks aggregated concurrently [default: number of CPUs]
    #[arg(long)]
    parallelism: Option<usize>,

    /// Output format: text or json
    #[arg(long, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Encoding of partial summaries between stages: pipe or json
    #[arg(long, default_value_t = WireFormat::Pipe)]
    wire_format: WireFormat,

    /// Decimal places kept for AVG and STDDEV
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: u32,

    /// Replace an existing output directory
    #[arg(long)]
    overwrite: bool,

    /// Keep encoded partials under <OUTPUT_DIR>/_partials
    #[arg(long)]
    keep_partials: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> JobConfig {
        let mut config = JobConfig::new(self.input, self.output_dir)
            .with_chunk_size(self.chunk_size)
            .with_output_format(self.format)
            .with_wire_format(self.wire_format)
            .with_precision(self.precision)
            .with_overwrite(self.overwrite)
            .with_keep_partials(self.keep_partials);
        if let Some(parallelism) = self.parallelism {
            config = config.with_parallelism(parallelism);
        }
        config
    }

    /// Picks a logging preset from the flags: JSON lines for `--log-json`,
    /// the development preset once `-v` is given.
    fn logging_config(&self) -> LoggingConfig {
        let preset = if self.log_json {
            LoggingConfig::production()
        } else if self.verbose > 0 {
            LoggingConfig::development()
        } else {
            LoggingConfig::default()
        };
        preset.with_verbosity(self.verbose)
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    if let Err(e) = init_logging(args.logging_config()) {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.into_config();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let report = runtime
        .block_on(run_job(config))
        .context("basicstats job failed")?;

    info!(
        records = report.records,
        chunks = report.chunks,
        output = %report.output_path.display(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Done"
    );
    print!("{}", report.rendered);
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<StatsError>() {
        Some(e) if e.is_usage() => 2,
        _ => 1,
    }
}
