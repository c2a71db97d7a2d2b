//! Relationship create and retrieve probes.

use crate::keys;
use async_trait::async_trait;
use cts_client::{InstanceStatus, NewRelationship, Relationship, TypeDef};
use cts_harness::{ensure, Probe, ProbeContext, ProbeResult};
use std::collections::BTreeMap;

pub(crate) struct RelationshipCreateProbe;

#[async_trait]
impl Probe for RelationshipCreateProbe {
    fn code(&self) -> &'static str {
        "repository-relationship-create"
    }

    fn name(&self) -> &'static str {
        "Relationship creation"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[
            keys::METADATA_COLLECTION_ID,
            keys::RELATIONSHIP_TYPE,
            keys::ENTITY_GUID,
            keys::RELATED_ENTITY_GUID,
        ]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let collection_id = cx.require_str(keys::METADATA_COLLECTION_ID)?;
        let relationship_type: TypeDef = cx.require(keys::RELATIONSHIP_TYPE)?;
        let end1 = cx.require_str(keys::ENTITY_GUID)?;
        let end2 = cx.require_str(keys::RELATED_ENTITY_GUID)?;

        let created = cx
            .client()
            .add_relationship(&NewRelationship {
                type_def_guid: relationship_type.guid.clone(),
                end1_guid: end1.clone(),
                end2_guid: end2.clone(),
                properties: BTreeMap::new(),
            })
            .await?;
        cx.discover(keys::RELATIONSHIP_GUID, created.guid.clone());

        check_relationship(&created, &end1, &end2)?;
        ensure(
            created.instance_type.type_def_guid == relationship_type.guid,
            format!(
                "relationship {} has type {} but {} was requested",
                created.guid, created.instance_type.type_def_guid, relationship_type.guid
            ),
        )?;
        ensure(
            created.metadata_collection_id == collection_id,
            format!(
                "new relationship {} is homed in {} instead of {}",
                created.guid, created.metadata_collection_id, collection_id
            ),
        )?;
        ensure(
            created.status == InstanceStatus::Active,
            format!("new relationship {} is not active", created.guid),
        )
    }
}

pub(crate) struct RelationshipRetrieveProbe;

#[async_trait]
impl Probe for RelationshipRetrieveProbe {
    fn code(&self) -> &'static str {
        "repository-relationship-retrieve"
    }

    fn name(&self) -> &'static str {
        "Relationship retrieval"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::RELATIONSHIP_GUID, keys::ENTITY_GUID, keys::RELATED_ENTITY_GUID]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let guid = cx.require_str(keys::RELATIONSHIP_GUID)?;
        let end1 = cx.require_str(keys::ENTITY_GUID)?;
        let end2 = cx.require_str(keys::RELATED_ENTITY_GUID)?;

        let stored = cx.client().relationship(&guid).await?;
        ensure(stored.guid == guid, format!("asked for {} but got {}", guid, stored.guid))?;
        check_relationship(&stored, &end1, &end2)
    }
}

fn check_relationship(relationship: &Relationship, end1: &str, end2: &str) -> ProbeResult<()> {
    ensure(!relationship.guid.is_empty(), "relationship was returned without a guid")?;
    ensure(
        relationship.end1_guid == end1 && relationship.end2_guid == end2,
        format!(
            "relationship {} connects {} -> {}, expected {} -> {}",
            relationship.guid, relationship.end1_guid, relationship.end2_guid, end1, end2
        ),
    )
}
