//! Subcommand implementations

pub mod report;
pub mod run;
pub mod workbenches;
