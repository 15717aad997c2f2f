//! Sync command implementation.

use std::sync::Arc;

use ctisync_engine::{HttpCatalogClient, SyncConfig, SyncOutcome, Synchronizer};
use ctisync_model::{ResourceType, SpaceName};
use ctisync_store::{ConsumerOffsetTracker, ContentStores, InMemoryOffsetTracker};
use serde::Serialize;

/// Summary of one synchronization pass.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    /// Catalog context.
    pub context: String,
    /// Consumer name.
    pub consumer: String,
    /// What the run did.
    pub outcome: String,
    /// Offset the consumer ended on.
    pub offset: u64,
    /// Draft documents per resource type after the run.
    pub documents: Vec<TypeCount>,
}

/// Document count for one resource type.
#[derive(Debug, Serialize)]
pub struct TypeCount {
    /// The resource type token.
    pub resource_type: String,
    /// Number of documents held.
    pub count: usize,
}

/// Runs the sync command.
pub fn run(config: SyncConfig, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpCatalogClient::new(&config)?;
    let stores = Arc::new(ContentStores::in_memory());
    let tracker = Arc::new(InMemoryOffsetTracker::new());
    let context = config.context.clone();
    let consumer = config.consumer.clone();
    let synchronizer = Synchronizer::new(config, client, stores.clone(), tracker.clone());

    let outcome = synchronizer.run()?;
    let tracked = tracker.get(&context, &consumer)?;

    let outcome = match outcome {
        SyncOutcome::NoNewContent => "no new content".to_string(),
        SyncOutcome::Bootstrapped { offset } => format!("bootstrapped to offset {offset}"),
        SyncOutcome::Applied { new_offset } => {
            format!("applied changes up to offset {new_offset}")
        }
        SyncOutcome::SkippedAlreadyRunning => "skipped, a run was already active".to_string(),
    };

    let draft = stores.for_space(SpaceName::Draft);
    let documents = ResourceType::ALL
        .into_iter()
        .map(|resource_type| TypeCount {
            resource_type: resource_type.to_string(),
            count: draft.store(resource_type).len(),
        })
        .collect();

    let summary = SyncSummary {
        context,
        consumer,
        outcome,
        offset: tracked.offset,
        documents,
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Context:  {}", summary.context);
        println!("Consumer: {}", summary.consumer);
        println!("Outcome:  {}", summary.outcome);
        println!("Offset:   {}", summary.offset);
        println!("Draft documents:");
        for entry in &summary.documents {
            println!("  {:<12} {}", entry.resource_type, entry.count);
        }
    }

    Ok(())
}
