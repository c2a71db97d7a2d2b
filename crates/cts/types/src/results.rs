//! Result model for a conformance run.
//!
//! The tree is `LabResults -> WorkbenchResults -> ProfileResult ->
//! RequirementResult`, with the executed test cases listed per workbench in
//! execution order. Field names are part of the persisted format.

use crate::identity::ServerIdentity;
use crate::status::{Status, SupportLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A key/value pair of evidence a test case contributed to its workbench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredProperty {
    pub key: String,
    pub value: serde_json::Value,
}

/// Outcome of one executed test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Unique test case code within its workbench.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Requirements this test case contributes to.
    pub requirements: Vec<String>,
    /// Mandatory if any of its requirements is mandatory.
    pub mandatory: bool,
    pub status: Status,
    /// Diagnostic messages, in the order they were recorded.
    pub messages: Vec<String>,
    /// Discovery keys the test case needed before it could run.
    pub prerequisites: Vec<String>,
    /// Evidence contributed to the discovery context.
    pub discovered: Vec<DiscoveredProperty>,
    pub duration_ms: u64,
}

/// Folded outcome of one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementResult {
    pub id: String,
    pub description: String,
    pub mandatory: bool,
    pub status: Status,
    /// Contributing test case codes, in declaration order.
    pub test_cases: Vec<String>,
    /// Requirements whose discoveries this one relies on.
    pub depends_on: Vec<String>,
}

impl RequirementResult {
    /// A requirement is met only when every contributing test case succeeded.
    pub fn is_met(&self) -> bool {
        self.status.is_success()
    }
}

/// Folded outcome of one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResult {
    pub id: String,
    pub name: String,
    pub mandatory: bool,
    pub level: SupportLevel,
    /// True iff every mandatory requirement is met.
    pub supported: bool,
    pub requirements: Vec<RequirementResult>,
}

impl ProfileResult {
    /// Build a profile result, deriving its support level from its requirements.
    pub fn assess(
        id: impl Into<String>,
        name: impl Into<String>,
        mandatory: bool,
        requirements: Vec<RequirementResult>,
    ) -> Self {
        let level = SupportLevel::assess(requirements.iter().map(|r| (r.mandatory, r.status)));
        Self {
            id: id.into(),
            name: name.into(),
            mandatory,
            level,
            supported: level.is_supported(),
            requirements,
        }
    }

    /// Requirements that were not met, mandatory or not.
    pub fn unmet_requirements(&self) -> impl Iterator<Item = &RequirementResult> {
        self.requirements.iter().filter(|r| !r.is_met())
    }
}

/// Test case counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub not_supported: usize,
    pub unknown: usize,
}

impl Totals {
    /// Count a sequence of statuses.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Status>,
    {
        let mut totals = Totals::default();
        for status in statuses {
            totals.record(status);
        }
        totals
    }

    /// Count one status.
    pub fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Success => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Skipped => self.skipped += 1,
            Status::NotSupported => self.not_supported += 1,
            Status::Unknown => self.unknown += 1,
        }
    }

    /// Add another set of counts into this one.
    pub fn absorb(&mut self, other: &Totals) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.not_supported += other.not_supported;
        self.unknown += other.unknown;
    }

    /// Whether the per-status counts add up to the total.
    pub fn reconciles(&self) -> bool {
        self.passed + self.failed + self.skipped + self.not_supported + self.unknown == self.total
    }
}

/// Results of one workbench run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbenchResults {
    pub workbench_id: String,
    pub name: String,
    pub version: String,
    pub documentation_url: String,
    /// Profiles in catalog order.
    pub profiles: Vec<ProfileResult>,
    /// Test cases in execution order.
    pub test_cases: Vec<TestCaseResult>,
    pub totals: Totals,
    /// True iff every mandatory profile is supported.
    pub conformant: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl WorkbenchResults {
    /// Assemble workbench results, deriving totals and the conformant flag.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workbench_id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        documentation_url: impl Into<String>,
        profiles: Vec<ProfileResult>,
        test_cases: Vec<TestCaseResult>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let totals = Totals::from_statuses(test_cases.iter().map(|t| t.status));
        let conformant = profiles
            .iter()
            .filter(|p| p.mandatory)
            .all(|p| p.supported);
        Self {
            workbench_id: workbench_id.into(),
            name: name.into(),
            version: version.into(),
            documentation_url: documentation_url.into(),
            profiles,
            test_cases,
            totals,
            conformant,
            started_at,
            completed_at,
        }
    }

    /// Mandatory profiles the target does not support.
    pub fn unsupported_mandatory_profiles(&self) -> impl Iterator<Item = &ProfileResult> {
        self.profiles.iter().filter(|p| p.mandatory && !p.supported)
    }

    /// Optional profiles, supported or not, for the optional-capability summary.
    pub fn optional_profiles(&self) -> impl Iterator<Item = &ProfileResult> {
        self.profiles.iter().filter(|p| !p.mandatory)
    }

    /// Look up an executed test case by code.
    pub fn test_case(&self, code: &str) -> Option<&TestCaseResult> {
        self.test_cases.iter().find(|t| t.code == code)
    }

    /// Look up a profile by id.
    pub fn profile(&self, id: &str) -> Option<&ProfileResult> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

/// Results of a complete lab run against one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResults {
    pub run_id: Uuid,
    pub harness_version: String,
    pub server: ServerIdentity,
    /// Workbench results in registration order.
    pub workbenches: Vec<WorkbenchResults>,
    pub totals: Totals,
    /// True iff every workbench is conformant.
    pub verdict: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl LabResults {
    /// Fold workbench results into lab results.
    pub fn from_workbenches(
        server: ServerIdentity,
        harness_version: impl Into<String>,
        workbenches: Vec<WorkbenchResults>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let mut totals = Totals::default();
        for workbench in &workbenches {
            totals.absorb(&workbench.totals);
        }
        let verdict = workbenches.iter().all(|w| w.conformant);
        Self {
            run_id: Uuid::new_v4(),
            harness_version: harness_version.into(),
            server,
            workbenches,
            totals,
            verdict,
            started_at,
            completed_at,
        }
    }

    /// Look up a workbench result by id.
    pub fn workbench(&self, id: &str) -> Option<&WorkbenchResults> {
        self.workbenches.iter().find(|w| w.workbench_id == id)
    }

    /// Workbenches that are not conformant.
    pub fn failing_workbenches(&self) -> impl Iterator<Item = &WorkbenchResults> {
        self.workbenches.iter().filter(|w| !w.conformant)
    }
}
