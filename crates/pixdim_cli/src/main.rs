//! pixdim - print image dimensions by reading only file headers.

mod engine;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use engine::ScanConfig;
use pixdim::Limits;
use pixdim_io::ReaderOptions;
use report::Summary;

#[derive(Parser, Debug)]
#[command(name = "pixdim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files or directories to measure.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Descend into subdirectories.
    #[arg(short, long, default_value_t = false)]
    recursive: bool,

    /// Only measure files with these extensions (comma separated).
    #[arg(short, long, value_delimiter = ',')]
    ext: Vec<String>,

    /// Measure every file found in directories, whatever its extension.
    #[arg(short, long, default_value_t = false)]
    all: bool,

    /// Worker threads; defaults to the number of CPUs.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print one JSON object per file.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Print a read-cost summary after the file list.
    #[arg(short, long, default_value_t = false)]
    stats: bool,

    /// Read files with plain syscalls instead of mapping them.
    #[arg(long, default_value_t = false)]
    no_mmap: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = ScanConfig {
        recursive: args.recursive,
        extensions: args
            .ext
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect(),
        all: args.all,
        jobs: args.jobs.unwrap_or_else(num_cpus::get).max(1),
        reader: ReaderOptions {
            prefer_mmap: !args.no_mmap,
        },
        limits: Limits::default(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut summary = Summary::default();
    let mut write_error = None;

    engine::run(&args.paths, &config, |file| {
        summary.record(&file);
        if write_error.is_some() {
            return;
        }
        let written = if args.json {
            report::write_json(&mut out, &file)
        } else {
            report::write_line(&mut out, &file)
        };
        if let Err(e) = written {
            write_error = Some(e);
        }
    })?;

    if let Some(e) = write_error {
        // A closed pipe (e.g. `| head`) is not a failure
        if e.kind() != io::ErrorKind::BrokenPipe {
            return Err(e).context("failed to write report");
        }
    }

    if args.stats {
        summary.write(&mut out).context("failed to write summary")?;
    }
    out.flush().ok();

    Ok(if summary.failures() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
