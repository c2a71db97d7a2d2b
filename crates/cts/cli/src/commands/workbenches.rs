//! `cts workbenches`

use crate::error::{CliResult, EXIT_OK};
use crate::output;
use cts_client::{ClientConfig, HttpRepositoryClient};
use cts_harness::LabConfig;
use cts_types::ServerIdentity;
use std::sync::Arc;

/// List every registered workbench with its catalog.
///
/// Building the registry validates each catalog. The client is never called.
pub fn execute() -> CliResult<u8> {
    let unused = ServerIdentity::new("catalog", "http://localhost");
    let client = HttpRepositoryClient::new(ClientConfig::new(unused, "cts-user"))?;
    let workbenches = cts_workbenches::registry(Arc::new(client), &LabConfig::default())?;

    for (index, workbench) in workbenches.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print!(
            "{}",
            output::format_catalog(workbench.descriptor(), workbench.catalog())
        );
    }
    Ok(EXIT_OK)
}
