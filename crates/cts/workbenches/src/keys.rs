//! Discovery keys shared between probes.

pub use cts_harness::{SERVER_NAME_KEY, SERVER_ROOT_URL_KEY};

/// Free-text origin reported by the platform.
pub const PLATFORM_ORIGIN: &str = "platform.origin";

/// Home metadata collection id of the repository.
pub const METADATA_COLLECTION_ID: &str = "repository.metadata_collection_id";
/// Published type definition looked up by name (a serialized `TypeDef`).
pub const LOOKUP_TYPE: &str = "repository.lookup_type";
/// Entity type definition used for instance probes (a serialized `TypeDef`).
pub const ENTITY_TYPE: &str = "repository.entity_type";
/// Relationship type definition connecting two entities of `ENTITY_TYPE`.
pub const RELATIONSHIP_TYPE: &str = "repository.relationship_type";
/// Name of a string attribute of `ENTITY_TYPE`.
pub const STRING_PROPERTY: &str = "repository.string_property";

pub const ENTITY_GUID: &str = "repository.entity_guid";
pub const RELATED_ENTITY_GUID: &str = "repository.related_entity_guid";
pub const RELATIONSHIP_GUID: &str = "repository.relationship_guid";
/// Latest known version of the entity at `ENTITY_GUID`.
pub const ENTITY_VERSION: &str = "repository.entity_version";
/// Guid of the entity at `ENTITY_GUID`, set once soft-delete succeeded.
pub const DELETED_ENTITY_GUID: &str = "repository.deleted_entity_guid";
pub const REFERENCE_COPY_GUID: &str = "repository.reference_copy_guid";
