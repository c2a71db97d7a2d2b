//! Test doubles shared by the unit tests of this crate.

use crate::test_case::{Probe, ProbeContext, ProbeResult};
use async_trait::async_trait;
use cts_client::{
    ClientError, ClientResult, EntityDetail, NewEntity, NewRelationship, RegisteredService,
    Relationship, RepositoryClient, TypeDef,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// A client whose every call fails with a transport error.
pub struct OfflineClient;

fn offline<T>() -> ClientResult<T> {
    Err(ClientError::Transport("target offline".into()))
}

#[async_trait]
impl RepositoryClient for OfflineClient {
    async fn platform_origin(&self) -> ClientResult<String> {
        offline()
    }
    async fn active_servers(&self) -> ClientResult<Vec<String>> {
        offline()
    }
    async fn registered_services(&self) -> ClientResult<Vec<RegisteredService>> {
        offline()
    }
    async fn metadata_collection_id(&self) -> ClientResult<String> {
        offline()
    }
    async fn all_type_defs(&self) -> ClientResult<Vec<TypeDef>> {
        offline()
    }
    async fn type_def_by_name(&self, _name: &str) -> ClientResult<TypeDef> {
        offline()
    }
    async fn add_entity(&self, _request: &NewEntity) -> ClientResult<EntityDetail> {
        offline()
    }
    async fn entity_detail(&self, _guid: &str) -> ClientResult<EntityDetail> {
        offline()
    }
    async fn update_entity_properties(
        &self,
        _guid: &str,
        _properties: &BTreeMap<String, Value>,
    ) -> ClientResult<EntityDetail> {
        offline()
    }
    async fn find_entities_by_property_value(
        &self,
        _type_def_guid: &str,
        _search_criteria: &str,
    ) -> ClientResult<Vec<EntityDetail>> {
        offline()
    }
    async fn delete_entity(&self, _guid: &str) -> ClientResult<EntityDetail> {
        offline()
    }
    async fn restore_entity(&self, _guid: &str) -> ClientResult<EntityDetail> {
        offline()
    }
    async fn purge_entity(&self, _guid: &str) -> ClientResult<()> {
        offline()
    }
    async fn entity_history(&self, _guid: &str) -> ClientResult<Vec<EntityDetail>> {
        offline()
    }
    async fn save_entity_reference_copy(&self, _entity: &EntityDetail) -> ClientResult<()> {
        offline()
    }
    async fn add_relationship(&self, _request: &NewRelationship) -> ClientResult<Relationship> {
        offline()
    }
    async fn relationship(&self, _guid: &str) -> ClientResult<Relationship> {
        offline()
    }
    async fn purge_relationship(&self, _guid: &str) -> ClientResult<()> {
        offline()
    }
}

type ProbeBody = dyn Fn(&mut ProbeContext<'_>) -> ProbeResult<()> + Send + Sync;

/// A probe whose body is a synchronous closure.
pub struct FnProbe {
    code: &'static str,
    prerequisites: &'static [&'static str],
    body: Box<ProbeBody>,
}

impl FnProbe {
    pub fn new<F>(code: &'static str, prerequisites: &'static [&'static str], body: F) -> Self
    where
        F: Fn(&mut ProbeContext<'_>) -> ProbeResult<()> + Send + Sync + 'static,
    {
        Self {
            code,
            prerequisites,
            body: Box::new(body),
        }
    }
}

#[async_trait]
impl Probe for FnProbe {
    fn code(&self) -> &'static str {
        self.code
    }

    fn name(&self) -> &'static str {
        self.code
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        self.prerequisites
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        (self.body)(cx)
    }
}

/// Discovery key set before the sleep starts.
pub const SLEEPY_STARTED_KEY: &str = "sleepy.started";

/// A probe that sleeps before succeeding.
pub struct SleepyProbe {
    code: &'static str,
    delay: Duration,
}

impl SleepyProbe {
    pub fn new(code: &'static str, delay: Duration) -> Self {
        Self { code, delay }
    }
}

#[async_trait]
impl Probe for SleepyProbe {
    fn code(&self) -> &'static str {
        self.code
    }

    fn name(&self) -> &'static str {
        "sleepy probe"
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        cx.discover(SLEEPY_STARTED_KEY, self.code);
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// A probe that asks the target for its platform origin.
pub struct OriginProbe;

#[async_trait]
impl Probe for OriginProbe {
    fn code(&self) -> &'static str {
        "origin"
    }

    fn name(&self) -> &'static str {
        "platform origin"
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let origin = cx.client().platform_origin().await?;
        cx.discover("platform.origin", origin);
        Ok(())
    }
}
