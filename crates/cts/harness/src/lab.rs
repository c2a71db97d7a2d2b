//! The test lab: runs registered workbenches and computes the verdict.

use crate::error::{HarnessError, HarnessResult};
use crate::workbench::Workbench;
use chrono::Utc;
use cts_types::{LabResults, ServerIdentity, WorkbenchResults};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Version recorded in every result record.
pub const HARNESS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Execution settings for a lab run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabConfig {
    /// Run workbenches concurrently instead of one after another.
    pub parallel_workbenches: bool,
    /// Upper bound on a single probe execution.
    pub test_timeout: Duration,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            parallel_workbenches: false,
            test_timeout: Duration::from_secs(60),
        }
    }
}

/// The registered workbenches for one run.
pub struct TestLab {
    config: LabConfig,
    workbenches: Vec<Arc<dyn Workbench>>,
}

impl TestLab {
    /// Create a lab, rejecting an empty registry and duplicate ids.
    pub fn new(config: LabConfig, workbenches: Vec<Arc<dyn Workbench>>) -> HarnessResult<Self> {
        if workbenches.is_empty() {
            return Err(HarnessError::NoWorkbenches);
        }
        let mut ids = HashSet::new();
        for workbench in &workbenches {
            let id = workbench.descriptor().id.as_str();
            if !ids.insert(id) {
                return Err(HarnessError::DuplicateWorkbench(id.to_string()));
            }
        }
        Ok(Self {
            config,
            workbenches,
        })
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    /// Registered workbenches in registration order.
    pub fn workbenches(&self) -> &[Arc<dyn Workbench>] {
        &self.workbenches
    }

    /// Keep only the named workbenches. An empty selection keeps all.
    ///
    /// Registration order is preserved whatever order `ids` lists.
    pub fn select<S: AsRef<str>>(mut self, ids: &[S]) -> HarnessResult<Self> {
        if ids.is_empty() {
            return Ok(self);
        }
        let known: HashSet<&str> = self
            .workbenches
            .iter()
            .map(|w| w.descriptor().id.as_str())
            .collect();
        let mut wanted = HashSet::new();
        for id in ids {
            let id: &str = id.as_ref();
            if !known.contains(id) {
                return Err(HarnessError::UnknownWorkbench(id.to_string()));
            }
            wanted.insert(id.to_string());
        }
        self.workbenches
            .retain(|w| wanted.contains(w.descriptor().id.as_str()));
        Ok(self)
    }

    /// Run every workbench against `server`.
    ///
    /// A workbench that cannot complete aborts the whole run; no partial
    /// results are returned.
    pub async fn run(&self, server: &ServerIdentity) -> HarnessResult<LabResults> {
        let started_at = Utc::now();
        tracing::info!(
            server = %server,
            workbenches = self.workbenches.len(),
            parallel = self.config.parallel_workbenches,
            "Starting conformance run"
        );

        let results = if self.config.parallel_workbenches {
            try_join_all(self.workbenches.iter().map(|w| run_workbench(w.as_ref(), server))).await?
        } else {
            let mut results = Vec::with_capacity(self.workbenches.len());
            for workbench in &self.workbenches {
                results.push(run_workbench(workbench.as_ref(), server).await?);
            }
            results
        };

        let lab = LabResults::from_workbenches(
            server.clone(),
            HARNESS_VERSION,
            results,
            started_at,
            Utc::now(),
        );
        tracing::info!(
            run_id = %lab.run_id,
            total = lab.totals.total,
            passed = lab.totals.passed,
            failed = lab.totals.failed,
            verdict = lab.verdict,
            "Conformance run complete"
        );
        Ok(lab)
    }
}

async fn run_workbench(
    workbench: &dyn Workbench,
    server: &ServerIdentity,
) -> HarnessResult<WorkbenchResults> {
    let id = workbench.descriptor().id.clone();
    workbench.run_tests(server).await.map_err(|err| {
        tracing::error!(workbench = %id, error = %err, "Workbench aborted");
        match err {
            fault @ HarnessError::WorkbenchFault { .. } => fault,
            other => HarnessError::WorkbenchFault {
                workbench: id,
                reason: other.to_string(),
            },
        }
    })
}
