//! Integration tests for the synchronization and promotion flows.

use std::sync::Arc;

use ctisync_engine::{
    MockCatalogClient, SpacePromoter, SyncConfig, SyncError, SyncOutcome, Synchronizer,
};
use ctisync_model::{
    ChangePage, ChangeRecord, ChangeType, ConsumerInfo, DiffOp, ResourceType, SpaceName,
};
use ctisync_patch::{content_hash, PatchOperation};
use ctisync_store::{ConsumerOffsetTracker, ContentStores, InMemoryOffsetTracker};
use ctisync_testkit::{
    document_strategy, populated_stores, promotable_type_strategy, sample_payload, snapshot_line,
    write_snapshot_zip,
};
use proptest::prelude::*;
use serde_json::json;

fn config() -> SyncConfig {
    SyncConfig::new("security", "engine", "http://localhost:8080")
}

fn catalog(offset: u64, link: Option<&str>) -> ConsumerInfo {
    let mut info = ConsumerInfo::new("security", "engine");
    info.offset = offset;
    info.last_offset = offset;
    info.last_snapshot_link = link.map(str::to_string);
    info
}

fn create_record(offset: u64, resource_type: ResourceType, id: &str) -> ChangeRecord {
    ChangeRecord {
        context: "security".to_string(),
        offset,
        resource: id.to_string(),
        change_type: ChangeType::Create,
        version: 1,
        operations: vec![],
        payload: Some(sample_payload(resource_type, id)),
    }
}

#[test]
fn bootstrap_then_incremental_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let zip = write_snapshot_zip(
        &dir.path().join("snapshot.zip"),
        &[
            (
                "rules.json",
                vec![
                    snapshot_line(ResourceType::Rule, "rule-1"),
                    snapshot_line(ResourceType::Rule, "rule-2"),
                    snapshot_line(ResourceType::Policy, "policy-1"),
                ],
            ),
            ("iocs.json", vec![snapshot_line(ResourceType::Ioc, "ioc-1")]),
        ],
    );

    let client = MockCatalogClient::new();
    client.set_catalog_response(catalog(5, Some("http://localhost:8080/v1/files/snapshot.zip")));
    client.set_snapshot_file(zip);

    let stores = Arc::new(ContentStores::in_memory());
    let tracker = Arc::new(InMemoryOffsetTracker::new());
    let sync = Synchronizer::new(config(), client, stores.clone(), tracker.clone());

    // First contact loads the snapshot; the policy line is skipped.
    assert_eq!(sync.run().unwrap(), SyncOutcome::Bootstrapped { offset: 5 });
    let draft = stores.for_space(SpaceName::Draft);
    assert!(draft.store(ResourceType::Rule).exists("rule-1"));
    assert!(draft.store(ResourceType::Rule).exists("rule-2"));
    assert!(draft.store(ResourceType::Ioc).exists("ioc-1"));
    assert!(draft.store(ResourceType::Policy).is_empty());
    assert_eq!(tracker.get("security", "engine").unwrap().offset, 5);

    // The catalog has not moved.
    assert_eq!(sync.run().unwrap(), SyncOutcome::NoNewContent);

    // Three new changes arrive behind one head bump.
    let client = MockCatalogClient::new();
    client.set_catalog_response(catalog(8, None));
    client.push_change_page(ChangePage {
        data: vec![
            create_record(6, ResourceType::Decoder, "decoder-7"),
            ChangeRecord {
                context: "security".to_string(),
                offset: 7,
                resource: "rule-1".to_string(),
                change_type: ChangeType::Update,
                version: 2,
                operations: vec![PatchOperation::replace("/document/name", json!("Renamed rule"))],
                payload: None,
            },
            ChangeRecord {
                context: "security".to_string(),
                offset: 8,
                resource: "rule-2".to_string(),
                change_type: ChangeType::Delete,
                version: 2,
                operations: vec![],
                payload: None,
            },
        ],
    });
    let sync = Synchronizer::new(config(), client, stores.clone(), tracker.clone());

    assert_eq!(sync.run().unwrap(), SyncOutcome::Applied { new_offset: 8 });
    assert!(draft.store(ResourceType::Decoder).exists("decoder-7"));
    let rule = draft.store(ResourceType::Rule).get("rule-1").unwrap();
    assert_eq!(rule.document["name"], json!("Renamed rule"));
    assert!(!draft.store(ResourceType::Rule).exists("rule-2"));
    assert_eq!(tracker.get("security", "engine").unwrap().offset, 8);
}

#[test]
fn failed_page_leaves_the_offset_for_the_next_run() {
    let stores = Arc::new(ContentStores::in_memory());
    let tracker = Arc::new(InMemoryOffsetTracker::new());
    let mut starting = ConsumerInfo::new("security", "engine");
    starting.offset = 1;
    starting.last_offset = 1;
    tracker.set(&starting).unwrap();

    // An update for a document that was never created fails the page.
    let client = MockCatalogClient::new();
    client.set_catalog_response(catalog(3, None));
    client.push_change_page(ChangePage {
        data: vec![
            create_record(2, ResourceType::Rule, "rule-a"),
            ChangeRecord {
                context: "security".to_string(),
                offset: 3,
                resource: "rule-ghost".to_string(),
                change_type: ChangeType::Update,
                version: 1,
                operations: vec![PatchOperation::replace("/document/name", json!("x"))],
                payload: None,
            },
        ],
    });
    let sync = Synchronizer::new(config(), client, stores.clone(), tracker.clone());
    assert!(sync.run().is_err());
    assert_eq!(tracker.get("security", "engine").unwrap().offset, 1);

    // The next run replays the whole page; the already-applied create
    // is treated as applied and the fixed page goes through.
    let client = MockCatalogClient::new();
    client.set_catalog_response(catalog(3, None));
    client.push_change_page(ChangePage {
        data: vec![
            create_record(2, ResourceType::Rule, "rule-a"),
            create_record(3, ResourceType::Rule, "rule-b"),
        ],
    });
    let sync = Synchronizer::new(config(), client, stores.clone(), tracker.clone());
    assert_eq!(sync.run().unwrap(), SyncOutcome::Applied { new_offset: 3 });
    assert_eq!(tracker.get("security", "engine").unwrap().offset, 3);
}

#[test]
fn bootstrap_failure_keeps_the_consumer_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let zip = write_snapshot_zip(
        &dir.path().join("snapshot.zip"),
        &[(
            "rules.json",
            vec![
                snapshot_line(ResourceType::Rule, "rule-1"),
                json!({"payload": {"type": "rule", "document": {"name": "id is missing"}}}),
            ],
        )],
    );
    let client = MockCatalogClient::new();
    client.set_catalog_response(catalog(4, Some("http://localhost:8080/v1/files/snapshot.zip")));
    client.set_snapshot_file(zip);

    let tracker = Arc::new(InMemoryOffsetTracker::new());
    let sync = Synchronizer::new(
        config(),
        client,
        Arc::new(ContentStores::in_memory()),
        tracker.clone(),
    );

    let err = sync.run().unwrap_err();
    assert!(matches!(err, SyncError::BulkLoadFailed { failed: 1, .. }));
    assert_eq!(tracker.get("security", "engine").unwrap().offset, 0);
}

#[test]
fn transport_failure_leaves_everything_untouched() {
    let client = MockCatalogClient::new();
    client.set_connected(false);
    let tracker = Arc::new(InMemoryOffsetTracker::new());
    let sync = Synchronizer::new(
        config(),
        client,
        Arc::new(ContentStores::in_memory()),
        tracker.clone(),
    );

    let err = sync.run().unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(tracker.get("security", "engine").unwrap().offset, 0);
}

#[test]
fn promotion_carries_content_through_the_spaces() {
    let stores = populated_stores();
    let promoter = SpacePromoter::new(&stores);

    // Draft to test: every promotable type is new, the policy entry is
    // update-only, IoCs never appear in a diff.
    let diff = promoter.preview(SpaceName::Draft).unwrap();
    assert_eq!(diff.changes.len(), 6);
    assert_eq!(diff.changes.rules[0].operation, DiffOp::Add);
    assert_eq!(diff.changes.policy[0].operation, DiffOp::Update);
    promoter.promote(&diff).unwrap();

    let draft_rule = stores
        .for_space(SpaceName::Draft)
        .store(ResourceType::Rule)
        .get("rule-1")
        .unwrap();
    let test_rule = stores
        .for_space(SpaceName::Test)
        .store(ResourceType::Rule)
        .get("rule-1")
        .unwrap();
    assert_eq!(test_rule.hash(), draft_rule.hash());
    assert_eq!(test_rule.space.name, SpaceName::Test);
    assert!(stores
        .for_space(SpaceName::Test)
        .store(ResourceType::Ioc)
        .is_empty());

    // With nothing edited, only the policy (aggregate hash) differs.
    let diff = promoter.preview(SpaceName::Draft).unwrap();
    assert!(diff.changes.rules.is_empty());
    assert_eq!(diff.changes.policy.len(), 1);

    // Test to custom moves the same content one stage further.
    let diff = promoter.preview(SpaceName::Test).unwrap();
    promoter.promote(&diff).unwrap();
    let custom_rule = stores
        .for_space(SpaceName::Custom)
        .store(ResourceType::Rule)
        .get("rule-1")
        .unwrap();
    assert_eq!(custom_rule.hash(), draft_rule.hash());

    // Custom is the last stage.
    let err = promoter.preview(SpaceName::Custom).unwrap_err();
    assert!(matches!(err, SyncError::InvalidSourceSpace { .. }));
}

proptest! {
    // Promotion copies documents verbatim: the content hash in the
    // target space always equals the hash in the source space.
    #[test]
    fn promoted_documents_keep_their_content_hash(
        resource_type in promotable_type_strategy(),
        document in document_strategy(),
    ) {
        let id = document["id"].as_str().unwrap().to_string();
        let payload = json!({"type": resource_type.as_str(), "document": document});

        let stores = ContentStores::in_memory();
        stores
            .for_space(SpaceName::Draft)
            .create(resource_type, &id, &payload)
            .unwrap();

        let promoter = SpacePromoter::new(&stores);
        let diff = promoter.preview(SpaceName::Draft).unwrap();
        promoter.promote(&diff).unwrap();

        let source = stores
            .for_space(SpaceName::Draft)
            .store(resource_type)
            .get(&id)
            .unwrap();
        let target = stores
            .for_space(SpaceName::Test)
            .store(resource_type)
            .get(&id)
            .unwrap();
        prop_assert_eq!(target.document.clone(), source.document.clone());
        prop_assert_eq!(content_hash(&target.document), content_hash(&source.document));
    }
}
