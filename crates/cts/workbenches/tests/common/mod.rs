//! In-process fake repository server for end-to-end workbench tests.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cts_client::{
    AttributeDef, EntityDetail, InstanceStatus, InstanceType, NewEntity, NewRelationship,
    Relationship, TypeDef, TypeDefCategory,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const SERVER_NAME: &str = "cocoMDS1";
pub const USER_ID: &str = "garygeeke";

/// Behaviour switches for the fake server.
#[derive(Debug, Clone)]
pub struct FakeOptions {
    pub metadata_collection_id: String,
    pub history_supported: bool,
    pub soft_delete_supported: bool,
    pub list_server_as_active: bool,
    /// When false, every gallery attribute is an `int`.
    pub string_attributes: bool,
    pub entity_creation_supported: bool,
    /// Relationship purges answer 500 and keep the relationship.
    pub relationship_purge_fails: bool,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            metadata_collection_id: "fake-collection-0001".to_string(),
            history_supported: true,
            soft_delete_supported: true,
            list_server_as_active: true,
            string_attributes: true,
            entity_creation_supported: true,
            relationship_purge_fails: false,
        }
    }
}

#[derive(Default)]
struct Store {
    /// Every version of every entity, oldest first.
    entities: HashMap<String, Vec<EntityDetail>>,
    relationships: HashMap<String, Relationship>,
    next_guid: u64,
}

impl Store {
    fn guid(&mut self) -> String {
        self.next_guid += 1;
        format!("fake-guid-{:04}", self.next_guid)
    }

    fn latest(&self, guid: &str) -> Option<&EntityDetail> {
        self.entities.get(guid).and_then(|versions| versions.last())
    }

    fn push_version(&mut self, entity: EntityDetail) -> EntityDetail {
        self.entities
            .entry(entity.guid.clone())
            .or_default()
            .push(entity.clone());
        entity
    }
}

#[derive(Clone)]
struct AppState {
    options: Arc<FakeOptions>,
    store: Arc<Mutex<Store>>,
}

/// A running fake server.
pub struct FakeServer {
    pub root_url: String,
    store: Arc<Mutex<Store>>,
}

impl FakeServer {
    pub async fn start(options: FakeOptions) -> Self {
        let store = Arc::new(Mutex::new(Store::default()));
        let state = AppState {
            options: Arc::new(options),
            store: Arc::clone(&store),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            root_url: format!("http://{}", addr),
            store,
        }
    }

    /// Entities and relationships currently stored.
    pub fn instance_count(&self) -> usize {
        let store = self.store.lock().unwrap();
        store.entities.len() + store.relationships.len()
    }

    pub fn entity_count(&self) -> usize {
        self.store.lock().unwrap().entities.len()
    }
}

fn router(state: AppState) -> Router {
    const PLATFORM: &str = "/open-metadata/platform-services/users/:user/server-platform";
    const REPOSITORY: &str = "/servers/:server/open-metadata/repository-services/users/:user";

    let p = |path: &str| format!("{}{}", PLATFORM, path);
    let r = |path: &str| format!("{}{}", REPOSITORY, path);

    Router::new()
        .route(&p("/origin"), get(origin))
        .route(&p("/servers/active"), get(active_servers))
        .route(&p("/servers/:server/registered-services"), get(registered_services))
        .route(&r("/metadata-collection-id"), get(metadata_collection_id))
        .route(&r("/types/all"), get(all_types))
        .route(&r("/types/typedef/name/:name"), get(type_by_name))
        .route(&r("/instances/entity"), post(add_entity))
        .route(&r("/instances/entity/:guid"), get(entity_detail))
        .route(&r("/instances/entity/:guid/properties"), post(update_properties))
        .route(&r("/instances/entity/:guid/delete"), post(delete_entity))
        .route(&r("/instances/entity/:guid/restore"), post(restore_entity))
        .route(&r("/instances/entity/:guid/purge"), post(purge_entity))
        .route(&r("/instances/entity/:guid/history"), get(entity_history))
        .route(&r("/instances/entities/by-property-value"), post(find_by_property))
        .route(&r("/instances/entities/reference-copy"), post(save_reference_copy))
        .route(&r("/instances/relationship"), post(add_relationship))
        .route(&r("/instances/relationship/:guid"), get(relationship))
        .route(&r("/instances/relationship/:guid/purge"), post(purge_relationship))
        .with_state(state)
}

type Params = Path<HashMap<String, String>>;

fn param(params: &HashMap<String, String>, name: &str) -> String {
    params.get(name).cloned().unwrap_or_default()
}

fn failure(status: StatusCode, exception: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "relatedHTTPCode": status.as_u16(),
            "exceptionClassName": exception,
            "exceptionErrorMessage": message.into(),
        })),
    )
        .into_response()
}

fn entity_not_known(guid: &str) -> Response {
    failure(
        StatusCode::NOT_FOUND,
        "EntityNotKnownException",
        format!("entity {} is not known", guid),
    )
}

fn ok(mut body: Value) -> Response {
    if let Value::Object(map) = &mut body {
        map.insert("relatedHTTPCode".into(), json!(200));
    }
    Json(body).into_response()
}

fn gallery(options: &FakeOptions) -> Vec<TypeDef> {
    let attribute = |name: &str, kind: &str| AttributeDef {
        attribute_name: name.to_string(),
        attribute_type: if options.string_attributes { kind } else { "int" }.to_string(),
    };
    vec![
        TypeDef {
            guid: "type-counter".into(),
            name: "Counter".into(),
            version: 1,
            category: TypeDefCategory::EntityDef,
            super_type: None,
            attributes: vec![attribute("count", "int")],
            end1_entity_type: None,
            end2_entity_type: None,
        },
        TypeDef {
            guid: "type-asset".into(),
            name: "Asset".into(),
            version: 1,
            category: TypeDefCategory::EntityDef,
            super_type: None,
            attributes: vec![attribute("qualifiedName", "string"), attribute("owner", "string")],
            end1_entity_type: None,
            end2_entity_type: None,
        },
        TypeDef {
            guid: "type-asset-link".into(),
            name: "AssetLink".into(),
            version: 1,
            category: TypeDefCategory::RelationshipDef,
            super_type: None,
            attributes: Vec::new(),
            end1_entity_type: Some("Asset".into()),
            end2_entity_type: Some("Asset".into()),
        },
    ]
}

fn type_by_guid(options: &FakeOptions, guid: &str) -> Option<TypeDef> {
    gallery(options).into_iter().find(|t| t.guid == guid)
}

async fn origin() -> Response {
    ok(json!({ "resultString": "Fake repository platform 1.0" }))
}

async fn active_servers(State(state): State<AppState>) -> Response {
    let servers: Vec<&str> = if state.options.list_server_as_active {
        vec!["otherServer", SERVER_NAME]
    } else {
        vec!["otherServer"]
    };
    ok(json!({ "serverList": servers }))
}

async fn registered_services() -> Response {
    ok(json!({
        "services": [
            { "serviceName": "Repository Services", "serviceUrlMarker": "repository-services" },
            { "serviceName": "Platform Services", "serviceUrlMarker": "platform-services" }
        ]
    }))
}

async fn metadata_collection_id(State(state): State<AppState>) -> Response {
    ok(json!({ "guid": state.options.metadata_collection_id }))
}

async fn all_types(State(state): State<AppState>) -> Response {
    ok(json!({ "typeDefs": gallery(&state.options) }))
}

async fn type_by_name(State(state): State<AppState>, Path(params): Params) -> Response {
    let name = param(&params, "name");
    match gallery(&state.options).into_iter().find(|t| t.name == name) {
        Some(type_def) => ok(json!({ "typeDef": type_def })),
        None => failure(
            StatusCode::NOT_FOUND,
            "TypeDefNotKnownException",
            format!("type {} is not known", name),
        ),
    }
}

async fn add_entity(State(state): State<AppState>, Json(request): Json<NewEntity>) -> Response {
    if !state.options.entity_creation_supported {
        return failure(
            StatusCode::NOT_IMPLEMENTED,
            "FunctionNotSupportedException",
            "this repository only stores reference copies",
        );
    }
    let Some(type_def) = type_by_guid(&state.options, &request.type_def_guid) else {
        return failure(StatusCode::BAD_REQUEST, "TypeErrorException", "unknown entity type");
    };
    let mut store = state.store.lock().unwrap();
    let entity = EntityDetail {
        guid: store.guid(),
        instance_type: InstanceType {
            type_def_guid: type_def.guid,
            type_def_name: type_def.name,
        },
        metadata_collection_id: state.options.metadata_collection_id.clone(),
        version: 1,
        status: InstanceStatus::Active,
        properties: request.properties,
    };
    let entity = store.push_version(entity);
    ok(json!({ "entity": entity }))
}

async fn entity_detail(State(state): State<AppState>, Path(params): Params) -> Response {
    let guid = param(&params, "guid");
    let store = state.store.lock().unwrap();
    match store.latest(&guid) {
        Some(entity) => ok(json!({ "entity": entity })),
        None => entity_not_known(&guid),
    }
}

#[derive(Deserialize)]
struct PropertiesBody {
    properties: BTreeMap<String, Value>,
}

async fn update_properties(
    State(state): State<AppState>,
    Path(params): Params,
    Json(body): Json<PropertiesBody>,
) -> Response {
    let guid = param(&params, "guid");
    let mut store = state.store.lock().unwrap();
    let Some(mut entity) = store.latest(&guid).cloned() else {
        return entity_not_known(&guid);
    };
    entity.properties.extend(body.properties);
    entity.version += 1;
    let entity = store.push_version(entity);
    ok(json!({ "entity": entity }))
}

async fn delete_entity(State(state): State<AppState>, Path(params): Params) -> Response {
    if !state.options.soft_delete_supported {
        return failure(
            StatusCode::NOT_IMPLEMENTED,
            "FunctionNotSupportedException",
            "soft-delete is not supported",
        );
    }
    change_status(&state, &param(&params, "guid"), InstanceStatus::Active, InstanceStatus::Deleted)
}

async fn restore_entity(State(state): State<AppState>, Path(params): Params) -> Response {
    if !state.options.soft_delete_supported {
        return failure(
            StatusCode::NOT_IMPLEMENTED,
            "FunctionNotSupportedException",
            "restore is not supported",
        );
    }
    change_status(&state, &param(&params, "guid"), InstanceStatus::Deleted, InstanceStatus::Active)
}

fn change_status(
    state: &AppState,
    guid: &str,
    from: InstanceStatus,
    to: InstanceStatus,
) -> Response {
    let mut store = state.store.lock().unwrap();
    let Some(mut entity) = store.latest(guid).cloned() else {
        return entity_not_known(guid);
    };
    if entity.status != from {
        return failure(
            StatusCode::CONFLICT,
            "InvalidEntityStatusException",
            format!("entity {} is {:?}", guid, entity.status),
        );
    }
    entity.status = to;
    entity.version += 1;
    let entity = store.push_version(entity);
    ok(json!({ "entity": entity }))
}

async fn purge_entity(State(state): State<AppState>, Path(params): Params) -> Response {
    let guid = param(&params, "guid");
    let mut store = state.store.lock().unwrap();
    match store.entities.remove(&guid) {
        Some(_) => ok(json!({})),
        None => entity_not_known(&guid),
    }
}

async fn entity_history(State(state): State<AppState>, Path(params): Params) -> Response {
    if !state.options.history_supported {
        return failure(
            StatusCode::NOT_IMPLEMENTED,
            "FunctionNotSupportedException",
            "this repository keeps no history",
        );
    }
    let guid = param(&params, "guid");
    let store = state.store.lock().unwrap();
    match store.entities.get(&guid) {
        Some(versions) => ok(json!({ "entities": versions })),
        None => entity_not_known(&guid),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody {
    type_def_guid: String,
    search_criteria: String,
}

async fn find_by_property(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Response {
    let store = state.store.lock().unwrap();
    let matches: Vec<&EntityDetail> = store
        .entities
        .values()
        .filter_map(|versions| versions.last())
        .filter(|e| e.status == InstanceStatus::Active)
        .filter(|e| e.instance_type.type_def_guid == body.type_def_guid)
        .filter(|e| {
            e.properties
                .values()
                .any(|v| v.as_str() == Some(body.search_criteria.as_str()))
        })
        .collect();
    ok(json!({ "entities": matches }))
}

async fn save_reference_copy(
    State(state): State<AppState>,
    Json(entity): Json<EntityDetail>,
) -> Response {
    if entity.metadata_collection_id == state.options.metadata_collection_id {
        return failure(
            StatusCode::BAD_REQUEST,
            "InvalidParameterException",
            "a reference copy must be homed in another collection",
        );
    }
    let mut store = state.store.lock().unwrap();
    store.push_version(entity);
    ok(json!({}))
}

async fn add_relationship(
    State(state): State<AppState>,
    Json(request): Json<NewRelationship>,
) -> Response {
    let Some(type_def) = type_by_guid(&state.options, &request.type_def_guid) else {
        return failure(StatusCode::BAD_REQUEST, "TypeErrorException", "unknown relationship type");
    };
    let mut store = state.store.lock().unwrap();
    for end in [&request.end1_guid, &request.end2_guid] {
        if store.latest(end).is_none() {
            return entity_not_known(end);
        }
    }
    let relationship = Relationship {
        guid: store.guid(),
        instance_type: InstanceType {
            type_def_guid: type_def.guid,
            type_def_name: type_def.name,
        },
        metadata_collection_id: state.options.metadata_collection_id.clone(),
        version: 1,
        status: InstanceStatus::Active,
        end1_guid: request.end1_guid,
        end2_guid: request.end2_guid,
        properties: request.properties,
    };
    store
        .relationships
        .insert(relationship.guid.clone(), relationship.clone());
    ok(json!({ "relationship": relationship }))
}

async fn relationship(State(state): State<AppState>, Path(params): Params) -> Response {
    let guid = param(&params, "guid");
    let store = state.store.lock().unwrap();
    match store.relationships.get(&guid) {
        Some(relationship) => ok(json!({ "relationship": relationship })),
        None => failure(
            StatusCode::NOT_FOUND,
            "RelationshipNotKnownException",
            format!("relationship {} is not known", guid),
        ),
    }
}

async fn purge_relationship(State(state): State<AppState>, Path(params): Params) -> Response {
    if state.options.relationship_purge_fails {
        return failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "RepositoryErrorException",
            "relationship store is read-only",
        );
    }
    let guid = param(&params, "guid");
    let mut store = state.store.lock().unwrap();
    match store.relationships.remove(&guid) {
        Some(_) => ok(json!({})),
        None => failure(
            StatusCode::NOT_FOUND,
            "RelationshipNotKnownException",
            format!("relationship {} is not known", guid),
        ),
    }
}
