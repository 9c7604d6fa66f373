//! czds CLI - ICANN Centralized Zone Data Service downloader.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod credentials;
mod display;

use display::Format;

#[derive(Parser)]
#[command(name = "czds")]
#[command(about = "ICANN Centralized Zone Data Service downloader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// ICANN username (prompted if missing)
    #[arg(short, long, env = "CZDS_USER", global = true)]
    username: Option<String>,

    /// ICANN password (prompted if missing)
    #[arg(short, long, env = "CZDS_PASS", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Output directory. Files go to <output>/zones/<YYYY-MM-DD>
    #[arg(short, long, default_value = ".", global = true)]
    output: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every zone file the account has access to
    Zones {
        /// Maximum concurrent downloads
        #[arg(
            short,
            long,
            default_value = "3",
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        concurrency: usize,

        /// Decompress zone files after download
        #[arg(short, long)]
        decompress: bool,

        /// Keep the gzip files after decompression
        #[arg(short, long)]
        keep: bool,

        /// Attempts per zone file, including the first
        #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: u32,

        /// Fail downloads whose response has no Content-Length
        #[arg(long)]
        require_content_length: bool,
    },

    /// Download the zone request report
    Report {
        /// Replace the username in the report
        #[arg(short, long)]
        scrub: bool,

        /// Report output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Parse the report with a quote-aware CSV reader for JSON output
        #[arg(long)]
        strict_csv: bool,
    },
}

/// Logs go to stderr so they never interleave with summaries on stdout.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    init_tracing(cli.verbose, cli.quiet);
    let credentials = credentials::resolve(cli.username, cli.password)?;

    match command {
        Commands::Zones {
            concurrency,
            decompress,
            keep,
            max_attempts,
            require_content_length,
        } => {
            commands::zones::zones(
                &credentials,
                &cli.output,
                commands::zones::ZonesOptions {
                    concurrency,
                    decompress,
                    keep,
                    max_attempts,
                    require_content_length,
                },
                cli.quiet,
            )
            .await
        }
        Commands::Report {
            scrub,
            format,
            strict_csv,
        } => {
            commands::report::report(
                &credentials,
                &cli.output,
                scrub,
                format.into(),
                strict_csv,
                cli.quiet,
            )
            .await
        }
    }
}
