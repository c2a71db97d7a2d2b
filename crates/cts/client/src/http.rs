//! REST implementation of [`RepositoryClient`].

use crate::client::RepositoryClient;
use crate::error::{ClientError, ClientResult};
use crate::model::{
    EntityDetail, EntityListResponse, EntityResponse, GuidResponse, NewEntity, NewRelationship,
    RegisteredService, RegisteredServicesResponse, Relationship, RelationshipResponse,
    ServerListResponse, StringResponse, TypeDef, TypeDefGalleryResponse, TypeDefResponse,
    VoidResponse,
};
use async_trait::async_trait;
use cts_types::ServerIdentity;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Settings for [`HttpRepositoryClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server under test
    pub server: ServerIdentity,
    /// User id every call is issued on behalf of
    pub user_id: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Accept self-signed TLS certificates (development platforms)
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(server: ServerIdentity, user_id: impl Into<String>) -> Self {
        Self {
            server,
            user_id: user_id.into(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Service {
    Platform,
    Repository,
}

/// HTTP client for the platform and repository services of one server
pub struct HttpRepositoryClient {
    client: Client,
    root: Url,
    server_name: String,
    user_id: String,
}

impl HttpRepositoryClient {
    /// Create a new client, validating the server's root URL
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let root = Url::parse(&config.server.root_url).map_err(|e| {
            ClientError::Configuration(format!(
                "invalid root URL '{}': {}",
                config.server.root_url, e
            ))
        })?;

        if !matches!(root.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "root URL '{}' must use http or https",
                config.server.root_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            root,
            server_name: config.server.name,
            user_id: config.user_id,
        })
    }

    fn endpoint(&self, service: Service, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.root.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Configuration(format!("root URL '{}' cannot be a base", self.root))
            })?;
            path.pop_if_empty();
            match service {
                Service::Platform => {
                    path.extend([
                        "open-metadata",
                        "platform-services",
                        "users",
                        self.user_id.as_str(),
                        "server-platform",
                    ]);
                }
                Service::Repository => {
                    path.extend([
                        "servers",
                        self.server_name.as_str(),
                        "open-metadata",
                        "repository-services",
                        "users",
                        self.user_id.as_str(),
                    ]);
                }
            }
            path.extend(segments);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, service: Service, segments: &[&str]) -> ClientResult<T> {
        let url = self.endpoint(service, segments)?;
        let request = self.client.get(url.clone());
        self.send(request, &url).await
    }

    async fn post<B, T>(&self, service: Service, segments: &[&str], body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(service, segments)?;
        let request = self.client.post(url.clone()).json(body);
        self.send(request, &url).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> ClientResult<T> {
        tracing::debug!(url = %url, "protocol call");
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(url.as_str(), e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(url.as_str(), e))?;
        decode_envelope(url.as_str(), status, &body)
    }
}

/// Decode a response envelope, turning error statuses and exception
/// envelopes into [`ClientError`] values.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    url: &str,
    status: u16,
    body: &str,
) -> ClientResult<T> {
    let envelope: Option<Value> = serde_json::from_str(body).ok();

    let exception = envelope_field(envelope.as_ref(), "exceptionClassName")
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = envelope_field(envelope.as_ref(), "exceptionErrorMessage")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| url.to_string());
    let related = envelope_field(envelope.as_ref(), "relatedHTTPCode")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok());

    // The envelope's code wins when the transport reported success.
    let effective = match related {
        Some(code) if code >= 400 && (200..300).contains(&status) => code,
        _ => status,
    };

    if let Some(exception) = exception {
        return Err(classify_exception(exception, message, effective));
    }

    match effective {
        501 => return Err(ClientError::NotSupported(message)),
        401 | 403 => return Err(ClientError::NotAuthorized(message)),
        404 => return Err(ClientError::NotFound(message)),
        code if !(200..300).contains(&code) => {
            return Err(ClientError::Status {
                status: code,
                url: url.to_string(),
            })
        }
        _ => {}
    }

    let value = envelope
        .ok_or_else(|| ClientError::Decode(format!("response from {} is not JSON", url)))?;
    serde_json::from_value(value).map_err(|e| ClientError::Decode(format!("{}: {}", url, e)))
}

fn envelope_field<'a>(envelope: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    envelope.and_then(|v| v.get(name))
}

fn classify_exception(exception: String, message: String, status: u16) -> ClientError {
    if exception.contains("FunctionNotSupported") || status == 501 {
        ClientError::NotSupported(message)
    } else if exception.contains("UserNotAuthorized") || status == 401 || status == 403 {
        ClientError::NotAuthorized(message)
    } else if exception.contains("NotKnown") || status == 404 {
        ClientError::NotFound(message)
    } else {
        ClientError::Server { exception, message }
    }
}

#[async_trait]
impl RepositoryClient for HttpRepositoryClient {
    async fn platform_origin(&self) -> ClientResult<String> {
        let response: StringResponse = self.get(Service::Platform, &["origin"]).await?;
        Ok(response.result_string)
    }

    async fn active_servers(&self) -> ClientResult<Vec<String>> {
        let response: ServerListResponse =
            self.get(Service::Platform, &["servers", "active"]).await?;
        Ok(response.server_list)
    }

    async fn registered_services(&self) -> ClientResult<Vec<RegisteredService>> {
        let response: RegisteredServicesResponse = self
            .get(
                Service::Platform,
                &["servers", self.server_name.as_str(), "registered-services"],
            )
            .await?;
        Ok(response.services)
    }

    async fn metadata_collection_id(&self) -> ClientResult<String> {
        let response: GuidResponse = self
            .get(Service::Repository, &["metadata-collection-id"])
            .await?;
        Ok(response.guid)
    }

    async fn all_type_defs(&self) -> ClientResult<Vec<TypeDef>> {
        let response: TypeDefGalleryResponse =
            self.get(Service::Repository, &["types", "all"]).await?;
        Ok(response.type_defs)
    }

    async fn type_def_by_name(&self, name: &str) -> ClientResult<TypeDef> {
        let response: TypeDefResponse = self
            .get(Service::Repository, &["types", "typedef", "name", name])
            .await?;
        Ok(response.type_def)
    }

    async fn add_entity(&self, request: &NewEntity) -> ClientResult<EntityDetail> {
        let response: EntityResponse = self
            .post(Service::Repository, &["instances", "entity"], request)
            .await?;
        Ok(response.entity)
    }

    async fn entity_detail(&self, guid: &str) -> ClientResult<EntityDetail> {
        let response: EntityResponse = self
            .get(Service::Repository, &["instances", "entity", guid])
            .await?;
        Ok(response.entity)
    }

    async fn update_entity_properties(
        &self,
        guid: &str,
        properties: &BTreeMap<String, Value>,
    ) -> ClientResult<EntityDetail> {
        let body = serde_json::json!({ "properties": properties });
        let response: EntityResponse = self
            .post(
                Service::Repository,
                &["instances", "entity", guid, "properties"],
                &body,
            )
            .await?;
        Ok(response.entity)
    }

    async fn find_entities_by_property_value(
        &self,
        type_def_guid: &str,
        search_criteria: &str,
    ) -> ClientResult<Vec<EntityDetail>> {
        let body = serde_json::json!({
            "typeDefGuid": type_def_guid,
            "searchCriteria": search_criteria,
        });
        let response: EntityListResponse = self
            .post(
                Service::Repository,
                &["instances", "entities", "by-property-value"],
                &body,
            )
            .await?;
        Ok(response.entities)
    }

    async fn delete_entity(&self, guid: &str) -> ClientResult<EntityDetail> {
        let response: EntityResponse = self
            .post(
                Service::Repository,
                &["instances", "entity", guid, "delete"],
                &serde_json::json!({}),
            )
            .await?;
        Ok(response.entity)
    }

    async fn restore_entity(&self, guid: &str) -> ClientResult<EntityDetail> {
        let response: EntityResponse = self
            .post(
                Service::Repository,
                &["instances", "entity", guid, "restore"],
                &serde_json::json!({}),
            )
            .await?;
        Ok(response.entity)
    }

    async fn purge_entity(&self, guid: &str) -> ClientResult<()> {
        let _: VoidResponse = self
            .post(
                Service::Repository,
                &["instances", "entity", guid, "purge"],
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }

    async fn entity_history(&self, guid: &str) -> ClientResult<Vec<EntityDetail>> {
        let response: EntityListResponse = self
            .get(Service::Repository, &["instances", "entity", guid, "history"])
            .await?;
        Ok(response.entities)
    }

    async fn save_entity_reference_copy(&self, entity: &EntityDetail) -> ClientResult<()> {
        let _: VoidResponse = self
            .post(
                Service::Repository,
                &["instances", "entities", "reference-copy"],
                entity,
            )
            .await?;
        Ok(())
    }

    async fn add_relationship(&self, request: &NewRelationship) -> ClientResult<Relationship> {
        let response: RelationshipResponse = self
            .post(Service::Repository, &["instances", "relationship"], request)
            .await?;
        Ok(response.relationship)
    }

    async fn relationship(&self, guid: &str) -> ClientResult<Relationship> {
        let response: RelationshipResponse = self
            .get(Service::Repository, &["instances", "relationship", guid])
            .await?;
        Ok(response.relationship)
    }

    async fn purge_relationship(&self, guid: &str) -> ClientResult<()> {
        let _: VoidResponse = self
            .post(
                Service::Repository,
                &["instances", "relationship", guid, "purge"],
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }
}
