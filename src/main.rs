use std::io;
use std::path::PathBuf;

use clap::Parser;
use jemallocator::Jemalloc;
use somatic_mutation_summary::{ProcessorError, report, summarize};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Input used when no path is given on the command line
const DEFAULT_INPUT: &str = "../simple_somatic_mutation.open.BLCA-CN.tsv.gz";

/// Summarize an ICGC simple somatic mutation export
#[derive(Debug, Parser)]
#[command(name = "somatic-mutation-summary", version, about)]
struct Config {
    /// Gzip-compressed, tab-separated mutation file
    #[arg(default_value = DEFAULT_INPUT)]
    path: PathBuf,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let config = Config::parse();
    init_logging(config.verbose);

    if let Err(e) = run(&config) {
        if let Some(message) = exit_message(&e) {
            eprintln!("{}", message);
        }
        std::process::exit(1);
    }
}

/// Final stderr line for a failed run; a missing file was already reported by the loader.
fn exit_message(e: &ProcessorError) -> Option<String> {
    match e {
        ProcessorError::FileNotFound { .. } => None,
        other => Some(format!("Error: {}", other)),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(config: &Config) -> Result<(), ProcessorError> {
    tracing::debug!(path = %config.path.display(), "summarizing");
    let summary = summarize(&config.path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_reports(&mut out, &summary)?;
    Ok(())
}
