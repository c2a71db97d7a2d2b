//! Profile and requirement catalog.
//!
//! A catalog is the static description of what one workbench certifies:
//! profiles made of requirements, each requirement backed by test cases and
//! optionally depending on the discoveries of other requirements. Validation
//! turns a catalog plus the registered probe codes into an execution
//! schedule, or rejects it.

use crate::error::CatalogError;
use std::collections::{BTreeSet, HashMap, HashSet};

/// One protocol assertion, backed by one or more test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementDef {
    pub id: String,
    pub description: String,
    pub mandatory: bool,
    /// Test case codes; every one must succeed for the requirement to be met.
    pub test_cases: Vec<String>,
    /// Requirements whose test cases must run first.
    pub depends_on: Vec<String>,
}

impl RequirementDef {
    pub fn mandatory(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(id, description, true)
    }

    pub fn optional(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(id, description, false)
    }

    fn new(id: impl Into<String>, description: impl Into<String>, mandatory: bool) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            mandatory,
            test_cases: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    /// Add a contributing test case.
    pub fn tested_by(mut self, code: impl Into<String>) -> Self {
        self.test_cases.push(code.into());
        self
    }

    /// Declare a discovery dependency on another requirement.
    pub fn depends_on(mut self, requirement: impl Into<String>) -> Self {
        self.depends_on.push(requirement.into());
        self
    }
}

/// A named capability group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDef {
    pub id: String,
    pub name: String,
    pub mandatory: bool,
    pub requirements: Vec<RequirementDef>,
}

impl ProfileDef {
    pub fn mandatory(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, true)
    }

    pub fn optional(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, false)
    }

    fn new(id: impl Into<String>, name: impl Into<String>, mandatory: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mandatory,
            requirements: Vec::new(),
        }
    }

    pub fn requirement(mut self, requirement: RequirementDef) -> Self {
        self.requirements.push(requirement);
        self
    }
}

/// The ordered set of profiles one workbench certifies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileCatalog {
    profiles: Vec<ProfileDef>,
}

/// A test case slot in the execution schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTest {
    pub code: String,
    /// Every requirement this test case contributes to, in catalog order.
    pub requirements: Vec<String>,
    /// Mandatory if any of its requirements is mandatory.
    pub mandatory: bool,
}

impl ProfileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(mut self, profile: ProfileDef) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn profiles(&self) -> &[ProfileDef] {
        &self.profiles
    }

    /// All requirements in declaration order.
    pub fn requirements(&self) -> impl Iterator<Item = &RequirementDef> {
        self.profiles.iter().flat_map(|p| p.requirements.iter())
    }

    pub fn requirement(&self, id: &str) -> Option<&RequirementDef> {
        self.requirements().find(|r| r.id == id)
    }

    /// Validate the catalog against the registered probe codes and compute
    /// the test case execution order.
    ///
    /// Requirements are ordered topologically by their dependencies; among
    /// requirements that are ready at the same time, declaration order wins.
    /// A test case shared by several requirements runs once, at its first
    /// position.
    pub fn schedule(&self, probe_codes: &[&str]) -> Result<Vec<ScheduledTest>, CatalogError> {
        self.check_structure(probe_codes)?;
        let order = self.requirement_order()?;
        let requirements: Vec<&RequirementDef> = self.requirements().collect();

        let mut contributions: HashMap<&str, (Vec<String>, bool)> = HashMap::new();
        for requirement in &requirements {
            for code in &requirement.test_cases {
                let entry = contributions
                    .entry(code.as_str())
                    .or_insert_with(|| (Vec::new(), false));
                entry.0.push(requirement.id.clone());
                entry.1 |= requirement.mandatory;
            }
        }

        let mut scheduled = HashSet::new();
        let mut schedule = Vec::new();
        for index in order {
            for code in &requirements[index].test_cases {
                if !scheduled.insert(code.as_str()) {
                    continue;
                }
                let (serves, mandatory) = contributions
                    .get(code.as_str())
                    .cloned()
                    .unwrap_or_default();
                schedule.push(ScheduledTest {
                    code: code.clone(),
                    requirements: serves,
                    mandatory,
                });
            }
        }
        Ok(schedule)
    }

    fn check_structure(&self, probe_codes: &[&str]) -> Result<(), CatalogError> {
        if self.profiles.is_empty() {
            return Err(CatalogError::Empty);
        }
        if !self.profiles.iter().any(|p| p.mandatory) {
            return Err(CatalogError::NoMandatoryProfile);
        }

        let mut probes = HashSet::new();
        for code in probe_codes {
            if !probes.insert(*code) {
                return Err(CatalogError::DuplicateProbe(code.to_string()));
            }
        }

        let mut profile_ids = HashSet::new();
        let mut requirement_ids = HashSet::new();
        for profile in &self.profiles {
            if !profile_ids.insert(profile.id.as_str()) {
                return Err(CatalogError::DuplicateProfile(profile.id.clone()));
            }
            if !profile.requirements.iter().any(|r| r.mandatory) {
                return Err(CatalogError::NoMandatoryRequirement(profile.id.clone()));
            }
            for requirement in &profile.requirements {
                if !requirement_ids.insert(requirement.id.as_str()) {
                    return Err(CatalogError::DuplicateRequirement(requirement.id.clone()));
                }
            }
        }

        let mut referenced = HashSet::new();
        for requirement in self.requirements() {
            if requirement.test_cases.is_empty() {
                return Err(CatalogError::NoTestCases(requirement.id.clone()));
            }
            let mut seen = HashSet::new();
            for code in &requirement.test_cases {
                if !seen.insert(code.as_str()) {
                    return Err(CatalogError::RepeatedTestCase {
                        requirement: requirement.id.clone(),
                        test_case: code.clone(),
                    });
                }
                if !probes.contains(code.as_str()) {
                    return Err(CatalogError::UnknownTestCase {
                        requirement: requirement.id.clone(),
                        test_case: code.clone(),
                    });
                }
                referenced.insert(code.as_str());
            }
            for dependency in &requirement.depends_on {
                if !requirement_ids.contains(dependency.as_str()) {
                    return Err(CatalogError::UnknownDependency {
                        requirement: requirement.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        if let Some(unused) = probe_codes.iter().find(|code| !referenced.contains(*code)) {
            return Err(CatalogError::UnreferencedProbe(unused.to_string()));
        }
        Ok(())
    }

    /// Kahn's algorithm over requirement indices, preferring declaration order.
    fn requirement_order(&self) -> Result<Vec<usize>, CatalogError> {
        let requirements: Vec<&RequirementDef> = self.requirements().collect();
        let index: HashMap<&str, usize> = requirements
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.as_str(), i))
            .collect();

        let mut pending = vec![0usize; requirements.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); requirements.len()];
        for (i, requirement) in requirements.iter().enumerate() {
            let unique: BTreeSet<usize> = requirement
                .depends_on
                .iter()
                .filter_map(|d| index.get(d.as_str()).copied())
                .collect();
            pending[i] = unique.len();
            for dependency in unique {
                dependents[dependency].push(i);
            }
        }

        let mut ready: BTreeSet<usize> = (0..requirements.len())
            .filter(|i| pending[*i] == 0)
            .collect();
        let mut order = Vec::with_capacity(requirements.len());
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() < requirements.len() {
            let stuck = (0..requirements.len())
                .filter(|i| pending[*i] > 0)
                .map(|i| requirements[i].id.clone())
                .collect();
            return Err(CatalogError::DependencyCycle(stuck));
        }
        Ok(order)
    }
}
