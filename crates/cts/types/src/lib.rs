//! Core types for the repository conformance test suite.
//!
//! This crate holds the data that flows between the harness components and
//! out to persistence and report rendering:
//!
//! - [`Status`]: the outcome of a single test case, and the fold precedence
//!   used to derive requirement outcomes
//! - [`ServerIdentity`]: the target server under test
//! - [`LabResults`] / [`WorkbenchResults`] / [`ProfileResult`] /
//!   [`RequirementResult`] / [`TestCaseResult`]: the result tree
//! - [`Totals`]: test case counts by status
//!
//! All result entities are built fresh for a single run and are never
//! mutated once the run completes.

#![deny(unsafe_code)]

pub mod identity;
pub mod results;
pub mod status;

pub use identity::ServerIdentity;
pub use results::{
    DiscoveredProperty, LabResults, ProfileResult, RequirementResult, TestCaseResult, Totals,
    WorkbenchResults,
};
pub use status::{SupportLevel, Status};
