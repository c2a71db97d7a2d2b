//! `cts report`

use crate::error::{CliResult, EXIT_OK};
use clap::{Args, ValueEnum};
use cts_harness::{persist, report};
use cts_types::LabResults;
use std::path::PathBuf;

/// Rendering of a saved result record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Boxed plain text
    #[default]
    Text,
    /// Markdown tables
    Markdown,
    /// The record itself, pretty-printed
    Json,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Result record written by `cts run`
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,
}

pub fn execute(args: ReportArgs) -> CliResult<u8> {
    let results = persist::load(&args.file)?;
    print!("{}", render(&results, args.format)?);
    Ok(EXIT_OK)
}

pub fn render(results: &LabResults, format: ReportFormat) -> CliResult<String> {
    Ok(match format {
        ReportFormat::Text => report::render_text(results),
        ReportFormat::Markdown => report::render_markdown(results),
        ReportFormat::Json => format!("{}\n", serde_json::to_string_pretty(results)?),
    })
}
