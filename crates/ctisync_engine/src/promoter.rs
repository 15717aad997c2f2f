//! Space promotion.
//!
//! Content flows draft to test to custom. A promotion first previews
//! the differences between a source space and its target by comparing
//! content hashes, then copies the changed documents over (the source
//! copy is never touched) and refreshes the target's policy aggregate
//! hash so later runs can detect drift from the policy alone.

use std::collections::BTreeMap;

use ctisync_model::{
    ContentDocument, DiffEntry, DiffOp, ResourceType, SpaceDiff, SpaceInfo, SpaceName,
};
use ctisync_patch::{content_hash, sha256_hex};
use ctisync_store::{ContentStores, SpaceStores, StoreError};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{SyncError, SyncResult};

/// Resource list keys an integration document may reference.
const INTEGRATION_LISTS: [(&str, ResourceType); 3] = [
    ("decoders", ResourceType::Decoder),
    ("kvdbs", ResourceType::Kvdb),
    ("rules", ResourceType::Rule),
];

/// Copies content between spaces and keeps their hashes coherent.
pub struct SpacePromoter<'a> {
    stores: &'a ContentStores,
}

impl<'a> SpacePromoter<'a> {
    /// Creates a promoter over the given space stores.
    pub fn new(stores: &'a ContentStores) -> Self {
        Self { stores }
    }

    /// Computes what promoting `source` would change in its target.
    ///
    /// Documents are compared by `space.hash.sha256`: ids only in the
    /// source become `add`, ids only in the target `remove`, ids in
    /// both with differing hashes `update`. The policy is
    /// update-only; IoCs are not promotable and never appear.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceSpace` when `source` has no promotion
    /// target (custom is the last stage).
    pub fn preview(&self, source: SpaceName) -> SyncResult<SpaceDiff> {
        let target = source
            .promote()
            .ok_or(SyncError::InvalidSourceSpace { space: source })?;
        let source_stores = self.stores.for_space(source);
        let target_stores = self.stores.for_space(target);

        let mut diff = SpaceDiff::new(source);
        for resource_type in ResourceType::ALL {
            let Some(entries) = diff.changes.for_type_mut(resource_type) else {
                continue;
            };
            let source_hashes = hash_index(source_stores, resource_type);
            let target_hashes = hash_index(target_stores, resource_type);

            if resource_type == ResourceType::Policy {
                // The target policy hash is an aggregate, so it differs
                // from the source content hash whenever either side moved.
                for (id, hash) in &source_hashes {
                    if target_hashes.get(id) != Some(hash) {
                        entries.push(DiffEntry::new(DiffOp::Update, id.as_str()));
                    }
                }
                continue;
            }

            for (id, hash) in &source_hashes {
                match target_hashes.get(id) {
                    None => entries.push(DiffEntry::new(DiffOp::Add, id.as_str())),
                    Some(existing) if existing != hash => {
                        entries.push(DiffEntry::new(DiffOp::Update, id.as_str()));
                    }
                    Some(_) => {}
                }
            }
            for id in target_hashes.keys() {
                if !source_hashes.contains_key(id) {
                    entries.push(DiffEntry::new(DiffOp::Remove, id.as_str()));
                }
            }
        }

        debug!(
            source = %source,
            target = %target,
            entries = diff.changes.len(),
            "promotion preview computed"
        );
        Ok(diff)
    }

    /// Executes a promotion diff against the source space's target.
    ///
    /// Validation (source space, policy operations, referenced source
    /// documents) happens before any write. Each resource type is then
    /// applied independently; one type failing does not block the
    /// others, but the call reports `PartialPromotionFailure` naming
    /// the failed types. The target's policy aggregate hash is
    /// refreshed at the end.
    pub fn promote(&self, diff: &SpaceDiff) -> SyncResult<()> {
        let source = diff.space;
        let target = source
            .promote()
            .ok_or(SyncError::InvalidSourceSpace { space: source })?;
        let source_stores = self.stores.for_space(source);
        let target_stores = self.stores.for_space(target);

        validate(diff, source_stores)?;

        info!(
            source = %source,
            target = %target,
            entries = diff.changes.len(),
            "promoting space content"
        );

        let mut failed_types = Vec::new();
        for resource_type in ResourceType::ALL {
            let Some(entries) = diff.changes.for_type(resource_type) else {
                continue;
            };
            if entries.is_empty() {
                continue;
            }
            match promote_type(resource_type, entries, source_stores, target_stores, target) {
                Ok(()) => {
                    debug!(
                        resource_type = %resource_type,
                        entries = entries.len(),
                        "resource type promoted"
                    );
                }
                Err(err) => {
                    error!(
                        resource_type = %resource_type,
                        error = %err,
                        "promotion failed for resource type"
                    );
                    failed_types.push(resource_type);
                }
            }
        }

        if let Err(err) = refresh_policy_hashes(target_stores) {
            error!(error = %err, "failed to refresh the promoted policy hash");
            if !failed_types.contains(&ResourceType::Policy) {
                failed_types.push(ResourceType::Policy);
            }
        }

        if failed_types.is_empty() {
            Ok(())
        } else {
            Err(SyncError::PartialPromotionFailure { failed_types })
        }
    }
}

/// Rejects a diff before anything is written.
fn validate(diff: &SpaceDiff, source_stores: &SpaceStores) -> SyncResult<()> {
    for entry in &diff.changes.policy {
        if entry.operation != DiffOp::Update {
            return Err(SyncError::InvalidPolicyOperation {
                operation: entry.operation,
            });
        }
    }
    for resource_type in ResourceType::ALL {
        let Some(entries) = diff.changes.for_type(resource_type) else {
            continue;
        };
        let store = source_stores.store(resource_type);
        for entry in entries {
            let needs_source = matches!(entry.operation, DiffOp::Add | DiffOp::Update);
            if needs_source && !store.exists(&entry.id) {
                return Err(SyncError::MissingResource {
                    id: entry.id.clone(),
                    space: source_stores.space(),
                });
            }
        }
    }
    Ok(())
}

fn promote_type(
    resource_type: ResourceType,
    entries: &[DiffEntry],
    source: &SpaceStores,
    target: &SpaceStores,
    target_space: SpaceName,
) -> SyncResult<()> {
    let source_store = source.store(resource_type);
    let target_store = target.store(resource_type);
    for entry in entries {
        match entry.operation {
            DiffOp::Add | DiffOp::Update => {
                let document = source_store.get(&entry.id)?;
                target_store.put(&entry.id, promoted_copy(document, target_space))?;
            }
            DiffOp::Remove => {
                target_store.delete(&entry.id)?;
            }
        }
    }
    Ok(())
}

/// A copy of `source` re-homed into `target_space`, hash recomputed.
fn promoted_copy(source: ContentDocument, target_space: SpaceName) -> ContentDocument {
    let hash = content_hash(&source.document);
    ContentDocument {
        resource_type: source.resource_type,
        space: SpaceInfo::new(target_space, hash),
        decoder: source.decoder,
        document: source.document,
    }
}

/// Recomputes the aggregate hash of every policy in `target`.
fn refresh_policy_hashes(target: &SpaceStores) -> SyncResult<()> {
    let policy_store = target.store(ResourceType::Policy);
    for id in policy_store.ids() {
        let mut policy = policy_store.get(&id)?;
        let aggregate = aggregate_policy_hash(&policy, target)?;
        debug!(policy = %id, hash = %aggregate, "refreshed policy aggregate hash");
        policy.space.hash.sha256 = aggregate;
        policy_store.put(&id, policy)?;
    }
    Ok(())
}

/// Hash of hashes for one policy document.
///
/// Collects the policy's own hash, then per integration listed in the
/// policy: the integration's hash followed by the hashes of the
/// decoders, kvdbs and rules it references, all in listed order.
/// Missing referenced documents contribute nothing.
fn aggregate_policy_hash(policy: &ContentDocument, target: &SpaceStores) -> SyncResult<String> {
    let mut hashes = vec![policy.space.hash.sha256.clone()];

    let integration_store = target.store(ResourceType::Integration);
    for integration_id in string_list(&policy.document, "integrations") {
        let integration = match integration_store.get(&integration_id) {
            Ok(integration) => integration,
            Err(StoreError::NotFound { .. }) => {
                debug!(
                    integration = %integration_id,
                    "policy references an absent integration, skipping"
                );
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        hashes.push(integration.space.hash.sha256.clone());

        for (key, resource_type) in INTEGRATION_LISTS {
            let store = target.store(resource_type);
            for id in string_list(&integration.document, key) {
                match store.get(&id) {
                    Ok(document) => hashes.push(document.space.hash.sha256.clone()),
                    Err(StoreError::NotFound { .. }) => {
                        debug!(
                            id = %id,
                            integration = %integration_id,
                            "integration references an absent document, skipping"
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }

    Ok(sha256_hex(hashes.concat().as_bytes()))
}

/// Id-to-hash index of one store, ordered by id.
fn hash_index(stores: &SpaceStores, resource_type: ResourceType) -> BTreeMap<String, String> {
    stores
        .store(resource_type)
        .content_hashes()
        .into_iter()
        .collect()
}

/// The string entries of an array field, absent or non-array as empty.
fn string_list(document: &Value, key: &str) -> Vec<String> {
    document
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
