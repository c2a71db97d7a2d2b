//! The call-capable handle probes use to reach the target server.

use crate::error::ClientResult;
use crate::model::{
    EntityDetail, NewEntity, NewRelationship, RegisteredService, Relationship, TypeDef,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Protocol operations against one target server, on behalf of one user.
///
/// Implementations must be safe to share across workbenches running
/// concurrently.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    // ========== Platform services ==========

    /// Free-text description of the platform implementation.
    async fn platform_origin(&self) -> ClientResult<String>;

    /// Names of the servers currently active on the platform.
    async fn active_servers(&self) -> ClientResult<Vec<String>>;

    /// Services registered for the target server.
    async fn registered_services(&self) -> ClientResult<Vec<RegisteredService>>;

    // ========== Repository services: types ==========

    /// Identifier of the repository's home metadata collection.
    async fn metadata_collection_id(&self) -> ClientResult<String>;

    /// Every type definition the repository supports.
    async fn all_type_defs(&self) -> ClientResult<Vec<TypeDef>>;

    /// Look up a type definition by its unique name.
    async fn type_def_by_name(&self, name: &str) -> ClientResult<TypeDef>;

    // ========== Repository services: entities ==========

    async fn add_entity(&self, request: &NewEntity) -> ClientResult<EntityDetail>;

    async fn entity_detail(&self, guid: &str) -> ClientResult<EntityDetail>;

    async fn update_entity_properties(
        &self,
        guid: &str,
        properties: &BTreeMap<String, Value>,
    ) -> ClientResult<EntityDetail>;

    /// Entities of the given type with any string property matching the criteria.
    async fn find_entities_by_property_value(
        &self,
        type_def_guid: &str,
        search_criteria: &str,
    ) -> ClientResult<Vec<EntityDetail>>;

    /// Soft-delete an entity, returning it in its deleted state.
    async fn delete_entity(&self, guid: &str) -> ClientResult<EntityDetail>;

    /// Restore a soft-deleted entity.
    async fn restore_entity(&self, guid: &str) -> ClientResult<EntityDetail>;

    /// Remove an entity and its history permanently.
    async fn purge_entity(&self, guid: &str) -> ClientResult<()>;

    /// Every stored version of an entity, oldest first.
    async fn entity_history(&self, guid: &str) -> ClientResult<Vec<EntityDetail>>;

    /// Store a copy of an entity homed in another metadata collection.
    async fn save_entity_reference_copy(&self, entity: &EntityDetail) -> ClientResult<()>;

    // ========== Repository services: relationships ==========

    async fn add_relationship(&self, request: &NewRelationship) -> ClientResult<Relationship>;

    async fn relationship(&self, guid: &str) -> ClientResult<Relationship>;

    async fn purge_relationship(&self, guid: &str) -> ClientResult<()>;
}
