//! Soft-delete, restore, history and purge probes.

use crate::keys;
use crate::repository::expect_not_found;
use async_trait::async_trait;
use cts_client::{InstanceStatus, RepositoryClient};
use cts_harness::{ensure, Probe, ProbeContext, ProbeError, ProbeResult};

pub(crate) struct SoftDeleteProbe;

#[async_trait]
impl Probe for SoftDeleteProbe {
    fn code(&self) -> &'static str {
        "repository-entity-soft-delete"
    }

    fn name(&self) -> &'static str {
        "Entity soft-delete"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::ENTITY_GUID, keys::ENTITY_VERSION]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let guid = cx.require_str(keys::ENTITY_GUID)?;
        let before: u64 = cx.require(keys::ENTITY_VERSION)?;

        let deleted = cx.client().delete_entity(&guid).await?;
        cx.discover(keys::ENTITY_VERSION, deleted.version);
        ensure(
            deleted.status == InstanceStatus::Deleted,
            format!("entity {} is {:?} after soft-delete", guid, deleted.status),
        )?;
        cx.discover(keys::DELETED_ENTITY_GUID, guid.clone());
        ensure(
            deleted.version > before,
            format!("entity {} version did not advance on soft-delete", guid),
        )
    }
}

pub(crate) struct RestoreProbe;

#[async_trait]
impl Probe for RestoreProbe {
    fn code(&self) -> &'static str {
        "repository-entity-restore"
    }

    fn name(&self) -> &'static str {
        "Entity restore"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::DELETED_ENTITY_GUID, keys::ENTITY_VERSION]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let guid = cx.require_str(keys::DELETED_ENTITY_GUID)?;
        let before: u64 = cx.require(keys::ENTITY_VERSION)?;

        let restored = cx.client().restore_entity(&guid).await?;
        cx.discover(keys::ENTITY_VERSION, restored.version);
        ensure(
            restored.status == InstanceStatus::Active,
            format!("entity {} is {:?} after restore", guid, restored.status),
        )?;
        ensure(
            restored.version > before,
            format!("entity {} version did not advance on restore", guid),
        )?;

        let stored = cx.client().entity_detail(&guid).await?;
        ensure(
            stored.status == InstanceStatus::Active,
            format!("restored entity {} is not retrievable as active", guid),
        )
    }
}

pub(crate) struct EntityHistoryProbe;

#[async_trait]
impl Probe for EntityHistoryProbe {
    fn code(&self) -> &'static str {
        "repository-entity-history"
    }

    fn name(&self) -> &'static str {
        "Entity version history"
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        &[keys::ENTITY_GUID, keys::ENTITY_VERSION]
    }

    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let guid = cx.require_str(keys::ENTITY_GUID)?;
        let latest: u64 = cx.require(keys::ENTITY_VERSION)?;

        let history = cx.client().entity_history(&guid).await?;
        cx.note(format!("entity {} has {} stored versions", guid, history.len()));
        ensure(!history.is_empty(), format!("no history for entity {}", guid))?;
        ensure(
            history.iter().all(|v| v.guid == guid),
            format!("history of {} contains other instances", guid),
        )?;
        ensure(
            history.windows(2).all(|pair| pair[0].version < pair[1].version),
            format!("history of {} is not ordered oldest first", guid),
        )?;
        let newest = history.last().map(|v| v.version).unwrap_or_default();
        ensure(
            newest == latest,
            format!(
                "newest version in history of {} is {}, expected {}",
                guid, newest, latest
            ),
        )
    }
}

/// Removes every instance the workbench created.
pub(crate) struct InstancePurgeProbe;

#[async_trait]
impl Probe for InstancePurgeProbe {
    fn code(&self) -> &'static str {
        "repository-instance-purge"
    }

    fn name(&self) -> &'static str {
        "Instance purge"
    }

    /// Purges whatever earlier test cases managed to create.
    async fn run(&self, cx: &mut ProbeContext<'_>) -> ProbeResult<()> {
        let client = cx.client();
        let relationship = discovered(cx, keys::RELATIONSHIP_GUID);
        let entity_keys = [
            keys::ENTITY_GUID,
            keys::RELATED_ENTITY_GUID,
            keys::REFERENCE_COPY_GUID,
        ];
        let entities: Vec<String> = entity_keys
            .into_iter()
            .filter_map(|key| discovered(cx, key))
            .collect();
        if relationship.is_none() && entities.is_empty() {
            return Err(ProbeError::Skipped("no instances were created".into()));
        }

        let mut first_error = None;
        if let Some(guid) = relationship {
            let outcome = purge_relationship(client, &guid).await;
            record(cx, &mut first_error, format!("relationship {}", guid), outcome);
        }
        for guid in entities {
            // Repositories with soft-delete only purge deleted entities.
            if let Err(err) = client.delete_entity(&guid).await {
                if !err.is_not_supported() {
                    cx.note(format!("soft-delete before purge of {}: {}", guid, err));
                }
            }
            let outcome = purge_entity(client, &guid).await;
            record(cx, &mut first_error, format!("entity {}", guid), outcome);
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

async fn purge_relationship(client: &dyn RepositoryClient, guid: &str) -> ProbeResult<()> {
    client.purge_relationship(guid).await?;
    expect_not_found(
        client.relationship(guid).await,
        &format!("purged relationship {}", guid),
    )
}

async fn purge_entity(client: &dyn RepositoryClient, guid: &str) -> ProbeResult<()> {
    client.purge_entity(guid).await?;
    expect_not_found(
        client.entity_detail(guid).await,
        &format!("purged entity {}", guid),
    )
}

/// Note the outcome of one purge, keeping the first failure.
fn record(
    cx: &mut ProbeContext<'_>,
    first_error: &mut Option<ProbeError>,
    instance: String,
    outcome: ProbeResult<()>,
) {
    match outcome {
        Ok(()) => cx.note(format!("purged {}", instance)),
        Err(err) => {
            cx.note(format!("purge of {} failed: {}", instance, err));
            first_error.get_or_insert(err);
        }
    }
}

fn discovered(cx: &ProbeContext<'_>, key: &str) -> Option<String> {
    cx.get(key).and_then(|v| v.as_str()).map(str::to_string)
}
