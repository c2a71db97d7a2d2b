//! CLI error types and exit codes

use cts_client::ClientError;
use cts_harness::HarnessError;
use thiserror::Error;

/// Success; for `run`, every workbench is conformant.
pub const EXIT_OK: u8 = 0;
/// The run finished but at least one workbench is not conformant.
pub const EXIT_NOT_CONFORMANT: u8 = 1;
/// No results could be produced.
pub const EXIT_NO_RESULTS: u8 = 2;
/// Results were produced but could not be written.
pub const EXIT_PERSIST_FAILED: u8 = 3;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Harness(#[from] HarnessError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    /// Results exist in memory but the record was not written.
    #[error("Results could not be saved: {0}")]
    Persist(#[source] HarnessError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Persist(_) => EXIT_PERSIST_FAILED,
            _ => EXIT_NO_RESULTS,
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
