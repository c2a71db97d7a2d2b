//! Shipped conformance workbenches.
//!
//! - [`PlatformWorkbench`]: platform origin, active server registration and
//!   registered services.
//! - [`RepositoryWorkbench`]: metadata collection, type definitions and the
//!   instance lifecycle (create, update, search, soft-delete and restore,
//!   history, reference copies, purge).
//!
//! [`registry`] builds the list the test lab runs, in registration order.

#![deny(unsafe_code)]

pub mod keys;
pub mod platform;
pub mod repository;

pub use platform::PlatformWorkbench;
pub use repository::RepositoryWorkbench;

use cts_client::RepositoryClient;
use cts_harness::{HarnessResult, LabConfig, Workbench};
use std::sync::Arc;

/// Every shipped workbench, bound to `client`.
///
/// Catalogs are validated here, so a catalog defect surfaces before any
/// server is contacted.
pub fn registry(
    client: Arc<dyn RepositoryClient>,
    config: &LabConfig,
) -> HarnessResult<Vec<Arc<dyn Workbench>>> {
    let workbenches: Vec<Arc<dyn Workbench>> = vec![
        Arc::new(PlatformWorkbench::new(Arc::clone(&client), config.test_timeout)?),
        Arc::new(RepositoryWorkbench::new(client, config.test_timeout)?),
    ];
    tracing::debug!(count = workbenches.len(), "Workbench registry built");
    Ok(workbenches)
}
