//! Persisted result records.

use crate::error::{HarnessError, HarnessResult};
use cts_types::LabResults;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of every persisted result file.
pub const RESULTS_FILE_SUFFIX: &str = ".conformance.json";

/// File name for a server's results.
///
/// Characters that are unsafe in file names are replaced with `_`.
pub fn results_file_name(server_name: &str) -> String {
    let sanitized: String = server_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = match sanitized.trim_start_matches('.') {
        "" => "server",
        stem => stem,
    };
    format!("{}{}", stem, RESULTS_FILE_SUFFIX)
}

/// Write `results` as pretty-printed JSON into `directory`.
///
/// Returns the path written.
pub fn save(results: &LabResults, directory: &Path) -> HarnessResult<PathBuf> {
    let path = directory.join(results_file_name(&results.server.name));
    let json = serde_json::to_string_pretty(results)?;

    fs::create_dir_all(directory).map_err(|source| HarnessError::Persist {
        path: directory.to_path_buf(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| HarnessError::Persist {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Results persisted");
    Ok(path)
}

/// Read a result record written by [`save`].
pub fn load(path: &Path) -> HarnessResult<LabResults> {
    let json = fs::read_to_string(path).map_err(|e| HarnessError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&json).map_err(|e| HarnessError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
