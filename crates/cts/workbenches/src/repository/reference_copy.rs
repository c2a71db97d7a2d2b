//! Reference copy probe.

use crate::keys;
use crate::repository::{check_entity, string_properties, REFERENCE_COPY_VALUE};
use async_trait::async_trait;
use cts_client::{EntityDetail, InstanceStatus, InstanceType, TypeDef};
use cts_harness::{ensure, Probe, ProbeContext, ProbeResult};
use uuid::Uuid;

/// Stores a copy of an entity homed in a made-up foreign collection and
/// checks the repository keeps the foreign home.
pub(crate) struct ReferenceCopyProbe;

#[async_trait]
impl Probe for ReferenceCopyProbe {
    fn code(&self) -> &'static str {
        "repository-entity-reference-copy"
    }

    fn name(&self) -> &'static str {
        "Entity reference copy"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::METADATA_COLLECTION_ID, keys::ENTITY_TYPE, keys::STRING_PROPERTY]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let local_collection = cx.require_str(keys::METADATA_COLLECTION_ID)?;
        let entity_type: TypeDef = cx.require(keys::ENTITY_TYPE)?;
        let property = cx.require_str(keys::STRING_PROPERTY)?;
        let client = cx.client();

        let foreign_collection = format!("cts-foreign-collection-{}", Uuid::new_v4());
        let copy = EntityDetail {
            guid: Uuid::new_v4().to_string(),
            instance_type: InstanceType {
                type_def_guid: entity_type.guid.clone(),
                type_def_name: entity_type.name.clone(),
            },
            metadata_collection_id: foreign_collection.clone(),
            version: 1,
            status: InstanceStatus::Active,
            properties: string_properties(&property, REFERENCE_COPY_VALUE),
        };

        client.save_entity_reference_copy(&copy).await?;
        cx.discover(keys::REFERENCE_COPY_GUID, copy.guid.clone());

        let stored = client.entity_detail(&copy.guid).await?;
        check_entity(&stored, &entity_type, &property, REFERENCE_COPY_VALUE)?;
        ensure(
            stored.metadata_collection_id == foreign_collection,
            format!(
                "reference copy {} is homed in {} instead of {}",
                copy.guid, stored.metadata_collection_id, foreign_collection
            ),
        )?;
        ensure(
            stored.metadata_collection_id != local_collection,
            format!("reference copy {} was adopted by the local collection", copy.guid),
        )
    }
}
