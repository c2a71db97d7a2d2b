//! End-to-end runs of the shipped workbenches against an in-process fake
//! repository server.

mod common;

use common::{FakeOptions, FakeServer, SERVER_NAME, USER_ID};
use cts_client::{ClientConfig, HttpRepositoryClient};
use cts_harness::{persist, LabConfig, TestLab};
use cts_types::{LabResults, ServerIdentity, Status, SupportLevel};
use cts_workbenches::{platform, registry, repository};
use std::sync::Arc;

async fn run_against(server: &FakeServer, parallel: bool) -> LabResults {
    let identity = ServerIdentity::new(SERVER_NAME, server.root_url.clone());
    let client = HttpRepositoryClient::new(ClientConfig::new(identity.clone(), USER_ID)).unwrap();
    let config = LabConfig {
        parallel_workbenches: parallel,
        ..LabConfig::default()
    };
    let workbenches = registry(Arc::new(client), &config).unwrap();
    let lab = TestLab::new(config, workbenches).unwrap();
    lab.run(&identity).await.unwrap()
}

fn status_of(results: &LabResults, workbench: &str, code: &str) -> Status {
    results
        .workbench(workbench)
        .and_then(|w| w.test_case(code))
        .map(|t| t.status)
        .unwrap_or_else(|| panic!("no result for {}/{}", workbench, code))
}

#[tokio::test]
async fn test_fully_featured_repository_is_conformant() {
    let server = FakeServer::start(FakeOptions::default()).await;
    let results = run_against(&server, false).await;

    for workbench in &results.workbenches {
        for case in &workbench.test_cases {
            assert_eq!(
                case.status,
                Status::Success,
                "{} failed: {:?}",
                case.code,
                case.messages
            );
        }
        for profile in &workbench.profiles {
            assert_eq!(profile.level, SupportLevel::FullSupport, "{}", profile.id);
        }
        assert!(workbench.conformant);
    }
    assert!(results.verdict);
    assert!(results.totals.reconciles());
    assert_eq!(results.totals.failed, 0);
    assert_eq!(results.totals.total, results.totals.passed);

    // Purge leaves nothing behind.
    assert_eq!(server.instance_count(), 0);
}

#[tokio::test]
async fn test_discovered_properties_are_recorded() {
    let server = FakeServer::start(FakeOptions::default()).await;
    let results = run_against(&server, false).await;

    let repository = results.workbench(repository::WORKBENCH_ID).unwrap();
    let mcid = repository
        .test_case("repository-metadata-collection-id")
        .unwrap();
    assert!(mcid
        .discovered
        .iter()
        .any(|d| d.key == "repository.metadata_collection_id" && d.value == "fake-collection-0001"));

    let types = repository.test_case("repository-type-definitions").unwrap();
    assert!(types
        .discovered
        .iter()
        .any(|d| d.key == "repository.string_property" && d.value == "qualifiedName"));
}

#[tokio::test]
async fn test_missing_history_is_not_supported_but_conformant() {
    let server = FakeServer::start(FakeOptions {
        history_supported: false,
        ..FakeOptions::default()
    })
    .await;
    let results = run_against(&server, false).await;

    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-history"),
        Status::NotSupported
    );
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-instance-purge"),
        Status::Success
    );

    let repository = results.workbench(repository::WORKBENCH_ID).unwrap();
    let history = repository.profile("historical-search").unwrap();
    assert_eq!(history.level, SupportLevel::NoSupport);
    assert!(!history.supported);
    assert!(repository.conformant);
    assert!(results.verdict);
    assert_eq!(results.totals.not_supported, 1);
    assert!(results.totals.reconciles());
}

#[tokio::test]
async fn test_missing_soft_delete_skips_restore() {
    let server = FakeServer::start(FakeOptions {
        soft_delete_supported: false,
        ..FakeOptions::default()
    })
    .await;
    let results = run_against(&server, false).await;

    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-soft-delete"),
        Status::NotSupported
    );
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-restore"),
        Status::Skipped
    );

    let repository = results.workbench(repository::WORKBENCH_ID).unwrap();
    let profile = repository.profile("soft-delete-and-restore").unwrap();
    assert_eq!(profile.level, SupportLevel::Undetermined);
    assert!(results.verdict);
}

#[tokio::test]
async fn test_empty_metadata_collection_id_is_not_conformant() {
    let server = FakeServer::start(FakeOptions {
        metadata_collection_id: String::new(),
        ..FakeOptions::default()
    })
    .await;
    let results = run_against(&server, false).await;

    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-metadata-collection-id"),
        Status::Failed
    );
    // Everything that needs the collection id is skipped.
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-create"),
        Status::Skipped
    );
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-reference-copy"),
        Status::Skipped
    );

    let repository = results.workbench(repository::WORKBENCH_ID).unwrap();
    let sharing = repository.profile("metadata-sharing").unwrap();
    assert_eq!(sharing.level, SupportLevel::NotConformant);
    assert!(!repository.conformant);
    assert!(results.workbench(platform::WORKBENCH_ID).unwrap().conformant);
    assert!(!results.verdict);
    assert_eq!(server.instance_count(), 0);
}

#[tokio::test]
async fn test_gallery_without_string_attributes_still_shares_metadata() {
    let server = FakeServer::start(FakeOptions {
        string_attributes: false,
        ..FakeOptions::default()
    })
    .await;
    let results = run_against(&server, false).await;

    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-typedef-by-name"),
        Status::Success
    );
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-create"),
        Status::Skipped
    );
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-instance-purge"),
        Status::Skipped
    );

    let repository = results.workbench(repository::WORKBENCH_ID).unwrap();
    let sharing = repository.profile("metadata-sharing").unwrap();
    assert_eq!(sharing.level, SupportLevel::FullSupport);
    assert!(sharing.supported);
    assert!(repository.conformant);
    assert!(results.verdict);
}

#[tokio::test]
async fn test_failed_relationship_purge_still_purges_entities() {
    let server = FakeServer::start(FakeOptions {
        relationship_purge_fails: true,
        ..FakeOptions::default()
    })
    .await;
    let results = run_against(&server, false).await;

    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-instance-purge"),
        Status::Failed
    );
    let repository = results.workbench(repository::WORKBENCH_ID).unwrap();
    let purge = repository.test_case("repository-instance-purge").unwrap();
    assert!(purge.messages.iter().any(|m| m.starts_with("purge of relationship")));
    assert_eq!(
        purge
            .messages
            .iter()
            .filter(|m| m.starts_with("purged entity"))
            .count(),
        3
    );

    assert_eq!(server.entity_count(), 0);
    assert_eq!(server.instance_count(), 1);
    // Purge is optional, so the workbench stays conformant.
    assert!(repository.conformant);
}

#[tokio::test]
async fn test_reference_copy_is_purged_without_entity_creation() {
    let server = FakeServer::start(FakeOptions {
        entity_creation_supported: false,
        ..FakeOptions::default()
    })
    .await;
    let results = run_against(&server, false).await;

    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-create"),
        Status::NotSupported
    );
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-entity-reference-copy"),
        Status::Success
    );
    assert_eq!(
        status_of(&results, repository::WORKBENCH_ID, "repository-instance-purge"),
        Status::Success
    );
    assert_eq!(server.instance_count(), 0);
}

#[tokio::test]
async fn test_inactive_server_fails_platform_workbench() {
    let server = FakeServer::start(FakeOptions {
        list_server_as_active: false,
        ..FakeOptions::default()
    })
    .await;
    let results = run_against(&server, false).await;

    assert_eq!(
        status_of(&results, platform::WORKBENCH_ID, "platform-active-servers"),
        Status::Failed
    );
    let failing: Vec<&str> = results
        .failing_workbenches()
        .map(|w| w.workbench_id.as_str())
        .collect();
    assert_eq!(failing, vec![platform::WORKBENCH_ID]);
    assert!(!results.verdict);
}

#[tokio::test]
async fn test_parallel_run_matches_sequential_run() {
    let server = FakeServer::start(FakeOptions {
        history_supported: false,
        ..FakeOptions::default()
    })
    .await;
    let sequential = run_against(&server, false).await;
    let parallel = run_against(&server, true).await;

    let ids = |results: &LabResults| -> Vec<String> {
        results
            .workbenches
            .iter()
            .map(|w| w.workbench_id.clone())
            .collect()
    };
    assert_eq!(ids(&sequential), ids(&parallel));
    assert_eq!(sequential.verdict, parallel.verdict);
    assert_eq!(sequential.totals, parallel.totals);
}

#[tokio::test]
async fn test_results_survive_persistence() {
    let server = FakeServer::start(FakeOptions::default()).await;
    let results = run_against(&server, false).await;

    let dir = tempfile::tempdir().unwrap();
    let path = persist::save(&results, dir.path()).unwrap();
    assert!(path.ends_with("cocoMDS1.conformance.json"));

    let loaded = persist::load(&path).unwrap();
    assert_eq!(loaded.run_id, results.run_id);
    assert_eq!(loaded.verdict, results.verdict);
    assert_eq!(loaded.totals, results.totals);
    assert_eq!(loaded.workbenches.len(), results.workbenches.len());
}
