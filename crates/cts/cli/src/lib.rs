//! `cts` - repository conformance test suite runner
//!
//! - `cts run` runs the registered workbenches against one repository server,
//!   prints a summary and saves the result record
//! - `cts report` renders a saved result record
//! - `cts workbenches` lists the registered workbenches and their catalogs
//!
//! Exit codes: `0` conformant (or success), `1` not conformant, `2` no
//! results, `3` results not saved.

use clap::{Args, Parser, Subcommand};
use cts_harness::config::LoggingSettings;
use std::ffi::OsString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

pub use error::{
    CliError, CliResult, EXIT_NOT_CONFORMANT, EXIT_NO_RESULTS, EXIT_OK, EXIT_PERSIST_FAILED,
};

/// Conformance test suite CLI
#[derive(Parser)]
#[command(name = "cts")]
#[command(about = "Repository conformance test suite", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    logging: LogArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run workbenches against a repository server
    Run(commands::run::RunArgs),

    /// Render a saved result record
    Report(commands::report::ReportArgs),

    /// List registered workbenches, profiles and requirements
    Workbenches,
}

/// Logging flags shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct LogArgs {
    /// Log level (`RUST_LOG` takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,
}

impl LogArgs {
    /// Install the global subscriber. Logs go to stderr so reports on stdout
    /// stay machine-readable.
    pub(crate) fn install(&self, settings: &LoggingSettings) {
        let level = self.log_level.as_deref().unwrap_or(&settings.level);
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| level.into());

        // A subscriber may already be installed when running in-process.
        let _ = if self.json_logs || settings.json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
    }
}

/// Run using the current process arguments and return the exit code.
pub async fn run() -> u8 {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator and return the exit code.
///
/// Errors are printed to stderr.
pub async fn run_with_args<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let outcome = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &cli.logging).await,
        Commands::Report(args) => {
            cli.logging.install(&LoggingSettings::default());
            commands::report::execute(args)
        }
        Commands::Workbenches => {
            cli.logging.install(&LoggingSettings::default());
            commands::workbenches::execute()
        }
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            output::print_error(&err.to_string());
            err.exit_code()
        }
    }
}
