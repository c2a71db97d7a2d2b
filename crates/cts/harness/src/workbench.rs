//! Workbenches: a catalog plus the probes that exercise it.

use crate::catalog::{ProfileCatalog, ScheduledTest};
use crate::context::DiscoveryContext;
use crate::error::{HarnessError, HarnessResult};
use crate::test_case::{Probe, TestCase};
use async_trait::async_trait;
use chrono::Utc;
use cts_client::RepositoryClient;
use cts_types::{
    ProfileResult, RequirementResult, ServerIdentity, Status, TestCaseResult, WorkbenchResults,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Identity of a workbench as shown in results and listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    pub documentation_url: String,
}

impl WorkbenchDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        documentation_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            documentation_url: documentation_url.into(),
        }
    }
}

/// A batch of test cases covering one protocol area.
#[async_trait]
pub trait Workbench: Send + Sync {
    fn descriptor(&self) -> &WorkbenchDescriptor;

    fn catalog(&self) -> &ProfileCatalog;

    /// Execute every test case once, in schedule order, and fold the results.
    ///
    /// Probe outcomes never surface as errors; an `Err` means the harness
    /// itself could not complete the run.
    async fn run_tests(&self, server: &ServerIdentity) -> HarnessResult<WorkbenchResults>;
}

/// A validated catalog bound to its probes and a client.
///
/// Building the plan is where catalog problems surface, so a plan that
/// exists can always be executed.
pub struct WorkbenchPlan {
    descriptor: WorkbenchDescriptor,
    catalog: ProfileCatalog,
    schedule: Vec<ScheduledTest>,
    probes: HashMap<&'static str, Arc<dyn Probe>>,
    client: Arc<dyn RepositoryClient>,
    test_timeout: Duration,
}

impl WorkbenchPlan {
    pub fn build(
        descriptor: WorkbenchDescriptor,
        catalog: ProfileCatalog,
        probes: Vec<Arc<dyn Probe>>,
        client: Arc<dyn RepositoryClient>,
        test_timeout: Duration,
    ) -> HarnessResult<Self> {
        let codes: Vec<&str> = probes.iter().map(|p| p.code()).collect();
        let schedule = catalog
            .schedule(&codes)
            .map_err(|source| HarnessError::Catalog {
                workbench: descriptor.id.clone(),
                source,
            })?;
        let probes = probes.into_iter().map(|p| (p.code(), p)).collect();

        Ok(Self {
            descriptor,
            catalog,
            schedule,
            probes,
            client,
            test_timeout,
        })
    }

    pub fn descriptor(&self) -> &WorkbenchDescriptor {
        &self.descriptor
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Test cases in execution order.
    pub fn schedule(&self) -> &[ScheduledTest] {
        &self.schedule
    }

    /// Run the schedule against `server` with a fresh discovery context.
    pub async fn execute(&self, server: &ServerIdentity) -> HarnessResult<WorkbenchResults> {
        let started_at = Utc::now();
        tracing::info!(
            workbench = %self.descriptor.id,
            server = %server,
            test_cases = self.schedule.len(),
            "Starting workbench"
        );

        let mut discovery = DiscoveryContext::seeded(server);
        let mut test_cases = Vec::with_capacity(self.schedule.len());
        for planned in &self.schedule {
            let probe = self.probes.get(planned.code.as_str()).cloned().ok_or_else(|| {
                HarnessError::WorkbenchFault {
                    workbench: self.descriptor.id.clone(),
                    reason: format!("no probe registered for '{}'", planned.code),
                }
            })?;
            let mut case = TestCase::new(probe, planned.requirements.clone(), planned.mandatory);
            case.execute(&mut discovery, self.client.as_ref(), self.test_timeout)
                .await?;
            test_cases.push(case.to_result());
        }

        let profiles = self.fold(&test_cases);
        let results = WorkbenchResults::new(
            self.descriptor.id.clone(),
            self.descriptor.name.clone(),
            self.descriptor.version.clone(),
            self.descriptor.documentation_url.clone(),
            profiles,
            test_cases,
            started_at,
            Utc::now(),
        );

        tracing::info!(
            workbench = %results.workbench_id,
            passed = results.totals.passed,
            failed = results.totals.failed,
            skipped = results.totals.skipped,
            not_supported = results.totals.not_supported,
            conformant = results.conformant,
            "Workbench complete"
        );
        Ok(results)
    }

    /// Fold test case statuses into requirements, and requirements into profiles.
    fn fold(&self, test_cases: &[TestCaseResult]) -> Vec<ProfileResult> {
        let statuses: HashMap<&str, Status> = test_cases
            .iter()
            .map(|t| (t.code.as_str(), t.status))
            .collect();

        self.catalog
            .profiles()
            .iter()
            .map(|profile| {
                let requirements = profile
                    .requirements
                    .iter()
                    .map(|requirement| RequirementResult {
                        id: requirement.id.clone(),
                        description: requirement.description.clone(),
                        mandatory: requirement.mandatory,
                        status: Status::fold(requirement.test_cases.iter().map(|code| {
                            statuses.get(code.as_str()).copied().unwrap_or(Status::Unknown)
                        })),
                        test_cases: requirement.test_cases.clone(),
                        depends_on: requirement.depends_on.clone(),
                    })
                    .collect();
                ProfileResult::assess(
                    profile.id.clone(),
                    profile.name.clone(),
                    profile.mandatory,
                    requirements,
                )
            })
            .collect()
    }
}
