use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod utils;

use commands::{FuzzOptions, fuzz_command, list_command};
use utils::{AtrPattern, parse_atr, parse_hex_byte};

/// Boxed error that can cross the blocking-task boundary
pub(crate) type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(version, about = "Discover which APDU commands a smart card accepts")]
struct Cli {
    /// Optional reader name to use (will use the first card presented if not specified)
    #[arg(short, long, conflicts_with = "atr")]
    reader: Option<String>,

    /// Only probe a card whose ATR starts with this hex pattern
    #[arg(long, value_parser = parse_atr)]
    atr: Option<AtrPattern>,

    /// Seconds to wait for a card before giving up
    #[arg(short, long, default_value_t = 30)]
    timeout: u64,

    /// File the probe log is appended to
    #[arg(short, long, default_value = "smart_fuzzer.log")]
    log_file: PathBuf,

    /// Debug level output in the log file
    #[arg(short, long)]
    verbose: bool,

    /// Extra instruction byte (hex) to never send; VERIFY and CHANGE REFERENCE DATA are always skipped
    #[arg(long = "skip-ins", value_name = "INS", value_parser = parse_hex_byte)]
    skip_ins: Vec<u8>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// List available readers
    List,

    /// Enumerate the command space of the card (default)
    Fuzz,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Parse command line arguments
    let cli = Cli::parse();

    setup_logging(&cli.log_file, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Fuzz) {
        Commands::List => list_command()?,
        Commands::Fuzz => {
            let options = FuzzOptions {
                reader: cli.reader,
                atr: cli.atr,
                timeout: cli.timeout,
                skip_ins: cli.skip_ins,
            };

            // Probing blocks on the card; keep the runtime free to notice Ctrl-C
            let task = tokio::task::spawn_blocking(move || fuzz_command(options));

            tokio::select! {
                result = task => result??,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted by operator");
                    println!("Interrupted, stopping.");
                    std::process::exit(0);
                }
            }
        }
    }

    Ok(())
}

fn setup_logging(log_file: &Path, verbose: bool) -> Result<(), BoxError> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
