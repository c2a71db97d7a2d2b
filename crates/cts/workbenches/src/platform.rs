//! Platform services workbench.
//!
//! Checks that the platform hosting the server under test identifies
//! itself, lists the server as active and reports the services registered
//! for it.

use crate::keys;
use async_trait::async_trait;
use cts_client::RepositoryClient;
use cts_harness::{
    ensure, HarnessResult, Probe, ProbeContext, ProbeError, ProbeResult, ProfileCatalog,
    ProfileDef, RequirementDef, Workbench, WorkbenchDescriptor, WorkbenchPlan,
};
use cts_types::{ServerIdentity, WorkbenchResults};
use std::sync::Arc;
use std::time::Duration;

pub const WORKBENCH_ID: &str = "platform-services";

const DOCUMENTATION_URL: &str = "docs/workbenches.md#platform-services";

/// Workbench for the platform services of the server's hosting platform.
pub struct PlatformWorkbench {
    plan: WorkbenchPlan,
}

impl PlatformWorkbench {
    pub fn new(client: Arc<dyn RepositoryClient>, test_timeout: Duration) -> HarnessResult<Self> {
        let plan = WorkbenchPlan::build(
            Self::describe(),
            Self::profile_catalog(),
            Self::probes(),
            client,
            test_timeout,
        )?;
        Ok(Self { plan })
    }

    fn describe() -> WorkbenchDescriptor {
        WorkbenchDescriptor::new(WORKBENCH_ID, "Platform services", "1.0", DOCUMENTATION_URL)
    }

    pub fn profile_catalog() -> ProfileCatalog {
        ProfileCatalog::new().profile(
            ProfileDef::mandatory("platform-services", "Platform services")
                .requirement(
                    RequirementDef::mandatory(
                        "platform-origin",
                        "The platform reports a non-empty origin description",
                    )
                    .tested_by(OriginProbe.code()),
                )
                .requirement(
                    RequirementDef::mandatory(
                        "platform-active-servers",
                        "The server under test is listed among the platform's active servers",
                    )
                    .tested_by(ActiveServersProbe.code())
                    .depends_on("platform-origin"),
                )
                .requirement(
                    RequirementDef::optional(
                        "platform-registered-services",
                        "The platform reports the services registered for the server",
                    )
                    .tested_by(RegisteredServicesProbe.code())
                    .depends_on("platform-active-servers"),
                ),
        )
    }

    fn probes() -> Vec<Arc<dyn Probe>> {
        vec![
            Arc::new(OriginProbe),
            Arc::new(ActiveServersProbe),
            Arc::new(RegisteredServicesProbe),
        ]
    }
}

#[async_trait]
impl Workbench for PlatformWorkbench {
    fn descriptor(&self) -> &WorkbenchDescriptor {
        self.plan.descriptor()
    }

    fn catalog(&self) -> &ProfileCatalog {
        self.plan.catalog()
    }

    async fn run_tests(&self, server: &ServerIdentity) -> HarnessResult<WorkbenchResults> {
        self.plan.execute(server).await
    }
}

struct OriginProbe;

#[async_trait]
impl Probe for OriginProbe {
    fn code(&self) -> &'static str {
        "platform-origin"
    }

    fn name(&self) -> &'static str {
        "Platform origin"
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let origin = cx.client().platform_origin().await?;
        ensure(!origin.trim().is_empty(), "platform origin is empty")?;
        cx.note(format!("platform origin: {}", origin));
        cx.discover(keys::PLATFORM_ORIGIN, origin);
        Ok(())
    }
}

struct ActiveServersProbe;

#[async_trait]
impl Probe for ActiveServersProbe {
    fn code(&self) -> &'static str {
        "platform-active-servers"
    }

    fn name(&self) -> &'static str {
        "Active server registration"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::SERVER_NAME_KEY, keys::PLATFORM_ORIGIN]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let server_name = cx.require_str(keys::SERVER_NAME_KEY)?;
        let active = cx.client().active_servers().await?;
        ensure(
            active.iter().any(|name| *name == server_name),
            format!(
                "server '{}' is not among the active servers [{}]",
                server_name,
                active.join(", ")
            ),
        )
    }
}

struct RegisteredServicesProbe;

#[async_trait]
impl Probe for RegisteredServicesProbe {
    fn code(&self) -> &'static str {
        "platform-registered-services"
    }

    fn name(&self) -> &'static str {
        "Registered services"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::SERVER_NAME_KEY]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let services = cx.client().registered_services().await?;
        ensure(!services.is_empty(), "no services are registered for the server")?;
        if let Some(unnamed) = services.iter().position(|s| s.service_name.trim().is_empty()) {
            return Err(ProbeError::Assertion(format!(
                "registered service #{} has no name",
                unnamed
            )));
        }
        let names: Vec<&str> = services.iter().map(|s| s.service_name.as_str()).collect();
        cx.note(format!("registered services: {}", names.join(", ")));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_schedules_every_probe() {
        let codes: Vec<&str> = PlatformWorkbench::probes().iter().map(|p| p.code()).collect();
        let schedule = PlatformWorkbench::profile_catalog().schedule(&codes).unwrap();
        let order: Vec<&str> = schedule.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(
            order,
            vec!["platform-origin", "platform-active-servers", "platform-registered-services"]
        );
        assert!(!schedule[2].mandatory);
    }
}
