//! Conformance test harness.
//!
//! The harness certifies that a repository server behaves according to the
//! repository protocol. Work is organised in three layers:
//!
//! - **Test cases** wrap a [`Probe`] and produce exactly one terminal
//!   [`Status`](cts_types::Status) per run. Probe faults of any kind are
//!   captured as results, never propagated.
//! - **Workbenches** own a [`ProfileCatalog`] of profiles and requirements,
//!   run their test cases one at a time in dependency order against a shared
//!   [`DiscoveryContext`], and fold the statuses into profile support.
//! - The **test lab** runs the registered workbenches and ANDs their
//!   conformance into a single verdict.
//!
//! ```ignore
//! let lab = TestLab::new(config.lab_config(), workbenches)?.select(&selected)?;
//! let results = lab.run(&server).await?;
//! persist::save(&results, &config.output.directory)?;
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod lab;
pub mod persist;
pub mod report;
pub mod test_case;
pub mod workbench;

#[cfg(test)]
mod testing;

pub use catalog::{ProfileCatalog, ProfileDef, RequirementDef, ScheduledTest};
pub use config::HarnessConfig;
pub use context::{DiscoveryContext, SERVER_NAME_KEY, SERVER_ROOT_URL_KEY};
pub use error::{CatalogError, HarnessError, HarnessResult};
pub use lab::{LabConfig, TestLab, HARNESS_VERSION};
pub use test_case::{ensure, Probe, ProbeContext, ProbeError, ProbeResult, TestCase};
pub use workbench::{Workbench, WorkbenchDescriptor, WorkbenchPlan};
