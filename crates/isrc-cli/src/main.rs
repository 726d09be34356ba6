//! # isrc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Registry-backed handlers run on a single-threaded tokio runtime.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use isrc_cli::registry::{
    run_export, run_generate, run_mark_used, run_summary, ExportArgs, GenerateArgs, MarkUsedArgs, SummaryArgs,
};
use isrc_cli::tag::{run_embed, run_extract, run_inspect, EmbedArgs, ExtractArgs, InspectArgs};
use isrc_cli::validate::{run_validate, ValidateArgs};
use isrc_cli::Settings;

/// ISRC registry and metadata tool
///
/// Issues sequential ISRC codes from a per-owner designation range, and
/// embeds or extracts them in MP3, WAV, JPEG and PNG files.
#[derive(Parser, Debug)]
#[command(name = "isrc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the registry document.
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Requester identity used to pick the designation range.
    #[arg(long, global = true)]
    owner_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue the next code for a track.
    Generate(GenerateArgs),

    /// Record that an issued code has been consumed.
    MarkUsed(MarkUsedArgs),

    /// Show registry counts.
    Summary(SummaryArgs),

    /// Export every issued code as CSV.
    Export(ExportArgs),

    /// Embed a code into an audio or image file.
    Embed(EmbedArgs),

    /// Read embedded codes from files.
    Extract(ExtractArgs),

    /// Describe a container and its embedded code.
    Inspect(InspectArgs),

    /// Check codes against the canonical format.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("isrc CLI starting");

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let settings = Settings::resolve(cli.config.as_deref(), cli.store_dir.as_deref(), cli.owner_key.as_deref())?;
    tracing::debug!(store_dir = %settings.store_dir.display(), "resolved settings");

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    match cli.command {
        Commands::Generate(args) => runtime.block_on(run_generate(&args, &settings)),
        Commands::MarkUsed(args) => runtime.block_on(run_mark_used(&args, &settings)),
        Commands::Summary(args) => runtime.block_on(run_summary(&args, &settings)),
        Commands::Export(args) => runtime.block_on(run_export(&args, &settings)),
        Commands::Embed(args) => runtime.block_on(run_embed(&args, &settings)),
        Commands::Extract(args) => run_extract(&args),
        Commands::Inspect(args) => run_inspect(&args),
        Commands::Validate(args) => run_validate(&args),
    }
}
