//! Error types for the conformance harness.
//!
//! Probe outcomes are never errors: a failing, skipped or unsupported probe is
//! recorded as a [`Status`](cts_types::Status). The errors here are harness
//! faults (a malformed catalog, an unregistered workbench, a logic error) and
//! persistence failures.

use cts_client::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Structural problems in a profile/requirement catalog.
///
/// Detected when a workbench is built, before any server call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog declares no profiles")]
    Empty,

    #[error("catalog declares no mandatory profile")]
    NoMandatoryProfile,

    #[error("duplicate profile id '{0}'")]
    DuplicateProfile(String),

    #[error("duplicate requirement id '{0}'")]
    DuplicateRequirement(String),

    #[error("profile '{0}' has no mandatory requirement")]
    NoMandatoryRequirement(String),

    #[error("requirement '{0}' names no test cases")]
    NoTestCases(String),

    #[error("requirement '{requirement}' lists test case '{test_case}' more than once")]
    RepeatedTestCase {
        requirement: String,
        test_case: String,
    },

    #[error("requirement '{requirement}' names test case '{test_case}' which has no registered probe")]
    UnknownTestCase {
        requirement: String,
        test_case: String,
    },

    #[error("duplicate probe code '{0}'")]
    DuplicateProbe(String),

    #[error("probe '{0}' is registered but no requirement references it")]
    UnreferencedProbe(String),

    #[error("requirement '{requirement}' depends on unknown requirement '{dependency}'")]
    UnknownDependency {
        requirement: String,
        dependency: String,
    },

    #[error("requirement dependency cycle among: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),
}

/// Harness faults.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A workbench catalog failed validation.
    #[error("invalid catalog for workbench '{workbench}': {source}")]
    Catalog {
        workbench: String,
        #[source]
        source: CatalogError,
    },

    /// Invalid harness configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Two registered workbenches share an id.
    #[error("duplicate workbench id '{0}'")]
    DuplicateWorkbench(String),

    /// A workbench id was selected that is not registered.
    #[error("unknown workbench '{0}'")]
    UnknownWorkbench(String),

    /// The lab has nothing to run.
    #[error("no workbenches registered")]
    NoWorkbenches,

    /// A test case instance was asked to execute twice.
    #[error("test case '{code}' executed more than once")]
    AlreadyExecuted { code: String },

    /// A workbench could not complete its run.
    #[error("workbench '{workbench}' could not complete: {reason}")]
    WorkbenchFault { workbench: String, reason: String },

    /// The protocol client could not be created.
    #[error("client setup failed: {0}")]
    Client(#[from] ClientError),

    /// Results could not be written.
    #[error("failed to persist results to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted result record could not be read back.
    #[error("failed to load results from {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("results serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HarnessError {
    /// Whether the error stems from configuration rather than from running.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HarnessError::Catalog { .. }
                | HarnessError::Configuration(_)
                | HarnessError::DuplicateWorkbench(_)
                | HarnessError::UnknownWorkbench(_)
                | HarnessError::NoWorkbenches
                | HarnessError::Client(_)
        )
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
