//! Repository services workbench.
//!
//! Exercises the metadata repository of the server under test: its home
//! metadata collection, the type definitions it publishes and, for the
//! optional profiles, the lifecycle of the instances the probes create.
//! Every instance a probe creates is purged again by the final probe.

mod entities;
mod lifecycle;
mod metadata;
mod reference_copy;
mod relationships;

use async_trait::async_trait;
use cts_client::{ClientResult, EntityDetail, RepositoryClient, TypeDef};
use cts_harness::{
    ensure, HarnessResult, Probe, ProbeError, ProbeResult, ProfileCatalog, ProfileDef,
    RequirementDef, Workbench, WorkbenchDescriptor, WorkbenchPlan,
};
use cts_types::{ServerIdentity, WorkbenchResults};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub const WORKBENCH_ID: &str = "repository-services";

const DOCUMENTATION_URL: &str = "docs/workbenches.md#repository-services";

/// String property values written by the instance probes.
pub(crate) const CREATED_VALUE: &str = "cts-conformance-entity";
pub(crate) const UPDATED_VALUE: &str = "cts-conformance-entity-updated";
pub(crate) const RELATED_VALUE: &str = "cts-conformance-related-entity";
pub(crate) const REFERENCE_COPY_VALUE: &str = "cts-conformance-reference-copy";

/// Workbench for the repository services of the server under test.
pub struct RepositoryWorkbench {
    plan: WorkbenchPlan,
}

impl RepositoryWorkbench {
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
        WorkbenchDescriptor::new(WORKBENCH_ID, "Repository services", "1.0", DOCUMENTATION_URL)
    }

    pub fn profile_catalog() -> ProfileCatalog {
        ProfileCatalog::new()
            .profile(
                ProfileDef::mandatory("metadata-sharing", "Metadata sharing")
                    .requirement(
                        RequirementDef::mandatory(
                            "metadata-collection-id",
                            "The repository reports a non-empty home metadata collection id",
                        )
                        .tested_by(metadata::MetadataCollectionIdProbe.code()),
                    )
                    .requirement(
                        RequirementDef::mandatory(
                            "type-definitions",
                            "The repository publishes well-formed type definitions",
                        )
                        .tested_by(metadata::TypeDefinitionsProbe.code()),
                    )
                    .requirement(
                        RequirementDef::mandatory(
                            "type-lookup",
                            "Type definitions can be retrieved by name and unknown names are rejected",
                        )
                        .tested_by(metadata::TypeDefByNameProbe.code())
                        .depends_on("type-definitions"),
                    ),
            )
            .profile(
                ProfileDef::optional("metadata-maintenance", "Metadata maintenance")
                    .requirement(
                        RequirementDef::mandatory(
                            "entity-lifecycle",
                            "Entities can be created, retrieved and updated",
                        )
                        .tested_by(entities::EntityCreateProbe.code())
                        .tested_by(entities::EntityRetrieveProbe.code())
                        .tested_by(entities::EntityUpdateProbe.code())
                        .depends_on("metadata-collection-id")
                        .depends_on("type-definitions"),
                    )
                    .requirement(
                        RequirementDef::mandatory(
                            "relationship-lifecycle",
                            "Relationships between entities can be created and retrieved",
                        )
                        .tested_by(relationships::RelationshipCreateProbe.code())
                        .tested_by(relationships::RelationshipRetrieveProbe.code())
                        .depends_on("entity-lifecycle"),
                    )
                    .requirement(
                        RequirementDef::optional(
                            "instance-purge",
                            "Instances can be purged and are no longer retrievable afterwards",
                        )
                        .tested_by(lifecycle::InstancePurgeProbe.code())
                        .depends_on("relationship-lifecycle")
                        .depends_on("entity-search")
                        .depends_on("soft-delete-restore")
                        .depends_on("entity-history")
                        .depends_on("reference-copy"),
                    ),
            )
            .profile(
                ProfileDef::optional("entity-search", "Entity search").requirement(
                    RequirementDef::mandatory(
                        "entity-search",
                        "Entities can be found by the value of a string property",
                    )
                    .tested_by(entities::FindByPropertyProbe.code())
                    .depends_on("entity-lifecycle"),
                ),
            )
            .profile(
                ProfileDef::optional("soft-delete-and-restore", "Soft-delete and restore")
                    .requirement(
                        RequirementDef::mandatory(
                            "soft-delete-restore",
                            "Entities can be soft-deleted and restored",
                        )
                        .tested_by(lifecycle::SoftDeleteProbe.code())
                        .tested_by(lifecycle::RestoreProbe.code())
                        .depends_on("entity-lifecycle"),
                    ),
            )
            .profile(
                ProfileDef::optional("historical-search", "Historical search").requirement(
                    RequirementDef::mandatory(
                        "entity-history",
                        "Every stored version of an entity can be retrieved",
                    )
                    .tested_by(lifecycle::EntityHistoryProbe.code())
                    .depends_on("entity-lifecycle"),
                ),
            )
            .profile(
                ProfileDef::optional("reference-copies", "Reference copies").requirement(
                    RequirementDef::mandatory(
                        "reference-copy",
                        "Reference copies keep the metadata collection id of their home repository",
                    )
                    .tested_by(reference_copy::ReferenceCopyProbe.code())
                    .depends_on("metadata-collection-id")
                    .depends_on("type-definitions"),
                ),
            )
    }

    fn probes() -> Vec<Arc<dyn Probe>> {
        vec![
            Arc::new(metadata::MetadataCollectionIdProbe),
            Arc::new(metadata::TypeDefinitionsProbe),
            Arc::new(metadata::TypeDefByNameProbe),
            Arc::new(entities::EntityCreateProbe),
            Arc::new(entities::EntityRetrieveProbe),
            Arc::new(entities::EntityUpdateProbe),
            Arc::new(entities::FindByPropertyProbe),
            Arc::new(relationships::RelationshipCreateProbe),
            Arc::new(relationships::RelationshipRetrieveProbe),
            Arc::new(lifecycle::SoftDeleteProbe),
            Arc::new(lifecycle::RestoreProbe),
            Arc::new(lifecycle::EntityHistoryProbe),
            Arc::new(reference_copy::ReferenceCopyProbe),
            Arc::new(lifecycle::InstancePurgeProbe),
        ]
    }
}

#[async_trait]
impl Workbench for RepositoryWorkbench {
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

/// A property map holding one string property.
pub(crate) fn string_properties(name: &str, value: &str) -> BTreeMap<String, Value> {
    BTreeMap::from([(name.to_string(), Value::String(value.to_string()))])
}

/// Check the parts of a stored entity a probe controls.
pub(crate) fn check_entity(
    entity: &EntityDetail,
    entity_type: &TypeDef,
    property: &str,
    value: &str,
) -> ProbeResult<()> {
    ensure(!entity.guid.is_empty(), "entity was returned without a guid")?;
    ensure(
        entity.instance_type.type_def_guid == entity_type.guid,
        format!(
            "entity {} has type {} but {} was requested",
            entity.guid, entity.instance_type.type_def_guid, entity_type.guid
        ),
    )?;
    let actual = entity.properties.get(property).and_then(Value::as_str);
    ensure(
        actual == Some(value),
        format!(
            "entity {} property '{}' is {:?}, expected {:?}",
            entity.guid, property, actual, value
        ),
    )
}

/// Succeed only if the target reports the instance as unknown.
pub(crate) fn expect_not_found<T>(result: ClientResult<T>, what: &str) -> ProbeResult<()> {
    match result {
        Err(err) if err.is_not_found() => Ok(()),
        Ok(_) => Err(ProbeError::Assertion(format!("{} is still retrievable", what))),
        Err(err) => Err(err.into()),
    }
}
