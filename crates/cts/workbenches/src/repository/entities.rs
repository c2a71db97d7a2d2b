//! Entity create, retrieve, update and search probes.

use crate::keys;
use crate::repository::{
    check_entity, expect_not_found, string_properties, CREATED_VALUE, RELATED_VALUE,
    UPDATED_VALUE,
};
use async_trait::async_trait;
use cts_client::{InstanceStatus, NewEntity, TypeDef};
use cts_harness::{ensure, Probe, ProbeContext, ProbeError, ProbeResult};
use serde_json::Value;
use uuid::Uuid;

pub(crate) struct EntityCreateProbe;

#[async_trait]
impl Probe for EntityCreateProbe {
    fn code(&self) -> &'static str {
        "repository-entity-create"
    }

    fn name(&self) -> &'static str {
        "Entity creation"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::METADATA_COLLECTION_ID, keys::ENTITY_TYPE, keys::STRING_PROPERTY]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let collection_id = cx.require_str(keys::METADATA_COLLECTION_ID)?;
        let entity_type: TypeDef = cx.require(keys::ENTITY_TYPE)?;
        let property = cx.require_str(keys::STRING_PROPERTY)?;
        let client = cx.client();

        for (key, value) in [(keys::ENTITY_GUID, CREATED_VALUE), (keys::RELATED_ENTITY_GUID, RELATED_VALUE)] {
            let created = client
                .add_entity(&NewEntity {
                    type_def_guid: entity_type.guid.clone(),
                    properties: string_properties(&property, value),
                })
                .await?;
            // Recorded before checking so the purge probe can clean up.
            cx.discover(key, created.guid.clone());
            if key == keys::ENTITY_GUID {
                cx.discover(keys::ENTITY_VERSION, created.version);
            }

            check_entity(&created, &entity_type, &property, value)?;
            ensure(
                created.metadata_collection_id == collection_id,
                format!(
                    "new entity {} is homed in {} instead of the local collection {}",
                    created.guid, created.metadata_collection_id, collection_id
                ),
            )?;
            ensure(
                created.status == InstanceStatus::Active,
                format!("new entity {} is not active", created.guid),
            )?;
        }
        Ok(())
    }
}

pub(crate) struct EntityRetrieveProbe;

#[async_trait]
impl Probe for EntityRetrieveProbe {
    fn code(&self) -> &'static str {
        "repository-entity-retrieve"
    }

    fn name(&self) -> &'static str {
        "Entity retrieval"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::ENTITY_TYPE, keys::ENTITY_GUID, keys::ENTITY_VERSION, keys::STRING_PROPERTY]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let entity_type: TypeDef = cx.require(keys::ENTITY_TYPE)?;
        let guid = cx.require_str(keys::ENTITY_GUID)?;
        let version: u64 = cx.require(keys::ENTITY_VERSION)?;
        let property = cx.require_str(keys::STRING_PROPERTY)?;
        let client = cx.client();

        let entity = client.entity_detail(&guid).await?;
        ensure(entity.guid == guid, format!("asked for {} but got {}", guid, entity.guid))?;
        ensure(
            entity.version == version,
            format!("entity {} is at version {}, expected {}", guid, entity.version, version),
        )?;
        check_entity(&entity, &entity_type, &property, CREATED_VALUE)?;

        let unknown = Uuid::new_v4().to_string();
        expect_not_found(
            client.entity_detail(&unknown).await,
            &format!("never-created entity {}", unknown),
        )
    }
}

pub(crate) struct EntityUpdateProbe;

#[async_trait]
impl Probe for EntityUpdateProbe {
    fn code(&self) -> &'static str {
        "repository-entity-update"
    }

    fn name(&self) -> &'static str {
        "Entity property update"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::ENTITY_TYPE, keys::ENTITY_GUID, keys::ENTITY_VERSION, keys::STRING_PROPERTY]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let entity_type: TypeDef = cx.require(keys::ENTITY_TYPE)?;
        let guid = cx.require_str(keys::ENTITY_GUID)?;
        let before: u64 = cx.require(keys::ENTITY_VERSION)?;
        let property = cx.require_str(keys::STRING_PROPERTY)?;
        let client = cx.client();

        let updated = client
            .update_entity_properties(&guid, &string_properties(&property, UPDATED_VALUE))
            .await?;
        cx.discover(keys::ENTITY_VERSION, updated.version);
        check_entity(&updated, &entity_type, &property, UPDATED_VALUE)?;
        ensure(
            updated.version > before,
            format!(
                "entity {} version did not advance on update ({} -> {})",
                guid, before, updated.version
            ),
        )?;

        let stored = client.entity_detail(&guid).await?;
        check_entity(&stored, &entity_type, &property, UPDATED_VALUE)?;
        ensure(
            stored.version == updated.version,
            format!("entity {} update was not persisted", guid),
        )
    }
}

pub(crate) struct FindByPropertyProbe;

#[async_trait]
impl Probe for FindByPropertyProbe {
    fn code(&self) -> &'static str {
        "repository-entity-find-by-property"
    }

    fn name(&self) -> &'static str {
        "Entity search by property value"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::ENTITY_TYPE, keys::ENTITY_GUID, keys::STRING_PROPERTY]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let entity_type: TypeDef = cx.require(keys::ENTITY_TYPE)?;
        let guid = cx.require_str(keys::ENTITY_GUID)?;
        let property = cx.require_str(keys::STRING_PROPERTY)?;
        let client = cx.client();

        let current = client.entity_detail(&guid).await?;
        let value = current
            .properties
            .get(&property)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProbeError::Skipped(format!("entity {} has no '{}' value to search for", guid, property))
            })?;

        let found = client
            .find_entities_by_property_value(&entity_type.guid, value)
            .await?;
        cx.note(format!("search for '{}' returned {} entities", value, found.len()));
        ensure(
            found.iter().any(|e| e.guid == guid),
            format!("search for '{}' did not return entity {}", value, guid),
        )?;
        ensure(
            found
                .iter()
                .all(|e| e.instance_type.type_def_guid == entity_type.guid),
            format!("search restricted to type '{}' returned other types", entity_type.name),
        )
    }
}
