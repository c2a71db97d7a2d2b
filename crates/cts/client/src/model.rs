//! Wire model for the repository services protocol.
//!
//! Field names follow the protocol's camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Category of a type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDefCategory {
    EntityDef,
    RelationshipDef,
    ClassificationDef,
}

/// One attribute declared by a type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub attribute_name: String,
    /// Primitive type name, e.g. `string`, `int`, `boolean`.
    pub attribute_type: String,
}

impl AttributeDef {
    pub fn is_string(&self) -> bool {
        self.attribute_type.eq_ignore_ascii_case("string")
    }
}

/// A type definition published by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub guid: String,
    pub name: String,
    pub version: u64,
    pub category: TypeDefCategory,
    #[serde(default)]
    pub super_type: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// Entity type name at end 1 (relationship definitions only).
    #[serde(default)]
    pub end1_entity_type: Option<String>,
    /// Entity type name at end 2 (relationship definitions only).
    #[serde(default)]
    pub end2_entity_type: Option<String>,
}

impl TypeDef {
    pub fn is_entity_def(&self) -> bool {
        self.category == TypeDefCategory::EntityDef
    }

    pub fn is_relationship_def(&self) -> bool {
        self.category == TypeDefCategory::RelationshipDef
    }

    /// First string-typed attribute, used for property-value searches.
    pub fn first_string_attribute(&self) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.is_string())
    }
}

/// Lifecycle status of a stored instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Active,
    Deleted,
}

/// Type reference carried by every instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceType {
    pub type_def_guid: String,
    pub type_def_name: String,
}

/// A stored entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetail {
    pub guid: String,
    #[serde(rename = "type")]
    pub instance_type: InstanceType,
    /// Home metadata collection of the instance.
    pub metadata_collection_id: String,
    pub version: u64,
    pub status: InstanceStatus,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// A stored relationship between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub guid: String,
    #[serde(rename = "type")]
    pub instance_type: InstanceType,
    pub metadata_collection_id: String,
    pub version: u64,
    pub status: InstanceStatus,
    pub end1_guid: String,
    pub end2_guid: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// Request body for creating an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntity {
    pub type_def_guid: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// Request body for creating a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelationship {
    pub type_def_guid: String,
    pub end1_guid: String,
    pub end2_guid: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

/// A service registered on the platform for a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredService {
    pub service_name: String,
    #[serde(default)]
    pub service_url_marker: Option<String>,
    #[serde(default)]
    pub service_description: Option<String>,
}

// Response payloads. Every response is a JSON envelope that may carry
// `relatedHTTPCode`, `exceptionClassName` and `exceptionErrorMessage`
// alongside one of these bodies.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StringResponse {
    pub result_string: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServerListResponse {
    #[serde(default)]
    pub server_list: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisteredServicesResponse {
    #[serde(default)]
    pub services: Vec<RegisteredService>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuidResponse {
    pub guid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TypeDefGalleryResponse {
    #[serde(default)]
    pub type_defs: Vec<TypeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TypeDefResponse {
    pub type_def: TypeDef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityResponse {
    pub entity: EntityDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityListResponse {
    #[serde(default)]
    pub entities: Vec<EntityDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationshipResponse {
    pub relationship: Relationship,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoidResponse {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_wire_format() {
        let json = serde_json::json!({
            "guid": "e-1",
            "type": { "typeDefGuid": "t-1", "typeDefName": "Asset" },
            "metadataCollectionId": "mc-1",
            "version": 1,
            "status": "ACTIVE",
            "properties": { "qualifiedName": "asset-1" }
        });
        let entity: EntityDetail = serde_json::from_value(json).unwrap();
        assert_eq!(entity.instance_type.type_def_name, "Asset");
        assert_eq!(entity.status, InstanceStatus::Active);
    }

    #[test]
    fn test_first_string_attribute() {
        let type_def = TypeDef {
            guid: "t-1".into(),
            name: "Asset".into(),
            version: 1,
            category: TypeDefCategory::EntityDef,
            super_type: None,
            attributes: vec![
                AttributeDef {
                    attribute_name: "count".into(),
                    attribute_type: "int".into(),
                },
                AttributeDef {
                    attribute_name: "qualifiedName".into(),
                    attribute_type: "string".into(),
                },
            ],
            end1_entity_type: None,
            end2_entity_type: None,
        };
        assert_eq!(
            type_def.first_string_attribute().map(|a| a.attribute_name.as_str()),
            Some("qualifiedName")
        );
        assert!(type_def.is_entity_def());
    }
}
