//! multilookup binary entry point.

use clap::Parser;
use multilookup::config::{HostOverride, ResolverKind};
use multilookup::{telemetry, Config, Pipeline};
use std::path::PathBuf;
use tracing::info;

/// Resolve every hostname in the input files and write "hostname, address" lines.
#[derive(Parser, Debug)]
#[command(name = "multilookup")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of resolver threads.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Capacity of the hostname queue.
    #[arg(short, long)]
    queue_capacity: Option<usize>,

    /// Resolution backend.
    #[arg(short, long, value_enum)]
    resolver: Option<ResolverKind>,

    /// Answer HOST with IP without a lookup (repeatable).
    #[arg(short = 'o', long = "override", value_name = "HOST=IP")]
    overrides: Vec<HostOverride>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Files to read hostnames from.
    #[arg(value_name = "INPUT", num_args = 1.., required = true)]
    inputs: Vec<PathBuf>,

    /// File the results are written to.
    #[arg(value_name = "OUTPUT", required = true)]
    output: PathBuf,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(threads) = self.threads {
            config.pipeline.threads = threads;
        }
        if let Some(capacity) = self.queue_capacity {
            config.pipeline.queue_capacity = capacity;
        }
        if let Some(backend) = self.resolver {
            config.resolver.backend = backend;
        }
        config.resolver.overrides.extend(self.overrides.iter().cloned());
        if let Some(level) = &self.log_level {
            config.telemetry.log_level = level.clone();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.pipeline.validate()?;

    // Initialize telemetry
    telemetry::init(&config.telemetry).map_err(|e| e as Box<dyn std::error::Error>)?;

    info!(
        inputs = args.inputs.len(),
        output = %args.output.display(),
        threads = config.pipeline.threads,
        queue_capacity = config.pipeline.queue_capacity,
        resolver = ?config.resolver.backend,
        "Starting multilookup"
    );

    let resolver = config.resolver.build()?;
    let report = Pipeline::new(config.pipeline, resolver).run_to_path(&args.inputs, &args.output)?;

    info!(
        lines = report.lines_written,
        unresolved = report.unresolved,
        files_failed = report.files_failed,
        "multilookup complete"
    );
    Ok(())
}
