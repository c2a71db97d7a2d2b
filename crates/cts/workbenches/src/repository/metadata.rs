//! Metadata collection and type definition probes.

use crate::keys;
use crate::repository::expect_not_found;
use async_trait::async_trait;
use cts_client::TypeDef;
use cts_harness::{ensure, Probe, ProbeContext, ProbeError, ProbeResult};
use std::collections::HashSet;

pub(crate) struct MetadataCollectionIdProbe;

#[async_trait]
impl Probe for MetadataCollectionIdProbe {
    fn code(&self) -> &'static str {
        "repository-metadata-collection-id"
    }

    fn name(&self) -> &'static str {
        "Metadata collection id"
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let collection_id = cx.client().metadata_collection_id().await?;
        ensure(
            !collection_id.trim().is_empty(),
            "repository reported an empty metadata collection id",
        )?;
        cx.discover(keys::METADATA_COLLECTION_ID, collection_id);
        Ok(())
    }
}

pub(crate) struct TypeDefinitionsProbe;

#[async_trait]
impl Probe for TypeDefinitionsProbe {
    fn code(&self) -> &'static str {
        "repository-type-definitions"
    }

    fn name(&self) -> &'static str {
        "Type definition gallery"
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let type_defs = cx.client().all_type_defs().await?;
        ensure(!type_defs.is_empty(), "repository publishes no type definitions")?;
        check_gallery(&type_defs)?;
        cx.note(format!("{} type definitions published", type_defs.len()));

        let selection = select_types(&type_defs);
        let lookup = selection.as_ref().map_or(&type_defs[0], |s| s.entity);
        cx.discover_json(keys::LOOKUP_TYPE, lookup)?;

        match selection {
            Some(selection) => {
                cx.note(format!(
                    "instance probes will use entity type '{}' with string property '{}'",
                    selection.entity.name, selection.string_property
                ));
                cx.discover_json(keys::ENTITY_TYPE, selection.entity)?;
                cx.discover(keys::STRING_PROPERTY, selection.string_property.clone());
                match selection.relationship {
                    Some(relationship) => cx.discover_json(keys::RELATIONSHIP_TYPE, relationship)?,
                    None => cx.note(format!(
                        "no relationship type connects two '{}' entities",
                        selection.entity.name
                    )),
                }
            }
            None => cx.note("no entity type declares a string attribute; instance probes will skip"),
        }
        Ok(())
    }
}

pub(crate) struct TypeDefByNameProbe;

#[async_trait]
impl Probe for TypeDefByNameProbe {
    fn code(&self) -> &'static str {
        "repository-typedef-by-name"
    }

    fn name(&self) -> &'static str {
        "Type definition lookup by name"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::LOOKUP_TYPE]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let expected: TypeDef = cx.require(keys::LOOKUP_TYPE)?;
        let client = cx.client();

        let found = client.type_def_by_name(&expected.name).await?;
        ensure(
            found.guid == expected.guid,
            format!(
                "type '{}' has guid {} by name but {} in the gallery",
                expected.name, found.guid, expected.guid
            ),
        )?;
        ensure(
            found.category == expected.category,
            format!("type '{}' changed category between lookups", expected.name),
        )?;

        let unknown = format!("{}CtsUnknownType", expected.name);
        expect_not_found(
            client.type_def_by_name(&unknown).await,
            &format!("undefined type '{}'", unknown),
        )
    }
}

/// Gallery-wide structural checks.
fn check_gallery(type_defs: &[TypeDef]) -> ProbeResult<()> {
    let mut guids = HashSet::new();
    let mut names = HashSet::new();
    for type_def in type_defs {
        if type_def.guid.trim().is_empty() || type_def.name.trim().is_empty() {
            return Err(ProbeError::Assertion(format!(
                "type definition without guid or name: {:?}",
                type_def.name
            )));
        }
        ensure(
            guids.insert(type_def.guid.as_str()),
            format!("type guid {} is published twice", type_def.guid),
        )?;
        ensure(
            names.insert(type_def.name.as_str()),
            format!("type name '{}' is published twice", type_def.name),
        )?;
    }
    Ok(())
}

/// Types the instance probes work with.
#[derive(Debug)]
pub(crate) struct TypeSelection<'a> {
    pub entity: &'a TypeDef,
    pub string_property: String,
    pub relationship: Option<&'a TypeDef>,
}

/// Pick an entity type with a string attribute, preferring one that a
/// relationship type can connect to itself.
pub(crate) fn select_types(type_defs: &[TypeDef]) -> Option<TypeSelection<'_>> {
    let mut fallback = None;
    for entity in type_defs.iter().filter(|t| t.is_entity_def()) {
        let Some(attribute) = entity.first_string_attribute() else {
            continue;
        };
        let relationship = type_defs
            .iter()
            .find(|t| t.is_relationship_def() && connects(t, &entity.name));
        let selection = TypeSelection {
            entity,
            string_property: attribute.attribute_name.clone(),
            relationship,
        };
        if selection.relationship.is_some() {
            return Some(selection);
        }
        fallback.get_or_insert(selection);
    }
    fallback
}

/// Whether both ends of a relationship type accept `entity_type`. An end
/// without a declared type accepts any entity.
fn connects(relationship: &TypeDef, entity_type: &str) -> bool {
    [&relationship.end1_entity_type, &relationship.end2_entity_type]
        .iter()
        .all(|end| end.as_deref().map_or(true, |name| name == entity_type))
}
