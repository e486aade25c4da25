#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use validator_bench::bench::{RunOptions, list_cmd, run_cmd};

#[derive(Parser, Debug)]
#[command(name = "validator-bench")]
#[command(about = "Cross-engine benchmark suite for object validation libraries", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set VALIDATOR_BENCH_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile every schema with every engine and measure each fixture
    Run {
        /// Suite configuration file (TOML, or YAML by extension)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Engine id to benchmark (repeatable; default all)
        #[arg(long = "engine")]
        engines: Vec<String>,
        /// Workload to register (repeatable; default all)
        #[arg(long = "workload")]
        workloads: Vec<String>,
        /// Number of warmup calls per pair
        #[arg(long)]
        warmup: Option<u32>,
        /// Number of measured calls per pair
        #[arg(long)]
        iterations: Option<u32>,
        /// Wall-clock budget per pair in milliseconds (0 disables)
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Compile engines concurrently
        #[arg(long)]
        parallel_compile: bool,
        /// Write machine-readable JSON report to this file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write Markdown report to this file
        #[arg(long)]
        markdown: Option<PathBuf>,
        /// Write per-result CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Exit with status 2 when any engine disagrees with a fixture
        #[arg(long)]
        fail_on_mismatch: bool,
    },

    /// List engines and built-in workloads
    List,
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("VALIDATOR_BENCH_LOG").unwrap_or_else(|_| {
        if verbose { "validator_bench=debug".to_string() } else { "validator_bench=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            engines,
            workloads,
            warmup,
            iterations,
            timeout_ms,
            parallel_compile,
            json,
            markdown,
            csv,
            fail_on_mismatch,
        } => run_cmd::run(RunOptions {
            config,
            engines,
            workloads,
            warmup,
            iterations,
            timeout_ms,
            parallel_compile,
            json,
            markdown,
            csv,
            fail_on_mismatch,
        }),
        Commands::List => list_cmd::run().map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
