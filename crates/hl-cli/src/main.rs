use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use hl_cli::commands::{self, append, generate, inspect, verify};
use hl_cli::settings::{GlobalArgs, Settings};
use hl_ledger::Timestamp;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Tamper-evident, hash-chained JSONL ledger.
#[derive(Parser, Debug)]
#[command(name = "hashlog", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Log at debug level (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify the chain: exit 0 if intact, 1 if broken, 2 if unreadable
    Verify {
        /// Ledger file (default: from configuration)
        path: Option<PathBuf>,
    },
    /// Append seeded fixture entries, continuing from the current tip
    Generate {
        /// Ledger file (default: from configuration)
        path: Option<PathBuf>,
        /// Number of entries to add
        #[arg(long, default_value_t = 150)]
        count: usize,
        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Clock for the first entry, in seconds (default: tip timestamp, else now)
        #[arg(long)]
        start_timestamp: Option<f64>,
    },
    /// Append one entry with a JSON object payload
    Append {
        /// Ledger file (default: from configuration)
        path: Option<PathBuf>,
        #[arg(long)]
        task_id: String,
        /// JSON object, e.g. '{"type": "deploy"}'
        #[arg(long)]
        payload: String,
        /// Seconds since the epoch (default: now)
        #[arg(long, value_parser = commands::parse_timestamp)]
        timestamp: Option<Timestamp>,
    },
    /// Display entries in human-readable form
    Log {
        /// Ledger file (default: from configuration)
        path: Option<PathBuf>,
        /// Show at most this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the tip hash and entry count
    Tip {
        /// Ledger file (default: from configuration)
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(verify::EXIT_UNREADABLE)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let global = cli.global;
    match cli.command {
        Commands::Verify { path } => {
            let settings = Settings::resolve(&global, path)?;
            Ok(verify::cmd_verify(&settings))
        }
        Commands::Generate {
            path,
            count,
            seed,
            start_timestamp,
        } => {
            let settings = Settings::resolve(&global, path)?;
            generate::cmd_generate(&settings, count, seed, start_timestamp)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Append {
            path,
            task_id,
            payload,
            timestamp,
        } => {
            let settings = Settings::resolve(&global, path)?;
            append::cmd_append(&settings, task_id, &payload, timestamp)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Log { path, limit } => {
            let settings = Settings::resolve(&global, path)?;
            inspect::cmd_log(&settings, limit)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Tip { path } => {
            let settings = Settings::resolve(&global, path)?;
            inspect::cmd_tip(&settings)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
