//! Preview command implementation.

use std::sync::Arc;

use ctisync_engine::{HttpCatalogClient, SpacePromoter, SyncConfig, Synchronizer};
use ctisync_model::{ResourceType, SpaceDiff, SpaceName};
use ctisync_store::{ContentStores, InMemoryOffsetTracker};

/// Runs the preview command: one sync pass, then the promotion diff.
pub fn run(
    config: SyncConfig,
    space: SpaceName,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpCatalogClient::new(&config)?;
    let stores = Arc::new(ContentStores::in_memory());
    let tracker = Arc::new(InMemoryOffsetTracker::new());
    let synchronizer = Synchronizer::new(config, client, stores.clone(), tracker);
    synchronizer.run()?;

    let promoter = SpacePromoter::new(&stores);
    let diff = promoter.preview(space)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print_diff(&diff);
    }

    Ok(())
}

/// Prints a diff as one line per entry, grouped by resource type.
pub fn print_diff(diff: &SpaceDiff) {
    match diff.space.promote() {
        Some(target) => println!("Promotion {} -> {}", diff.space, target),
        None => println!("Promotion from {}", diff.space),
    }
    if diff.changes.is_empty() {
        println!("  nothing to promote");
        return;
    }
    for resource_type in ResourceType::ALL {
        let Some(entries) = diff.changes.for_type(resource_type) else {
            continue;
        };
        for entry in entries {
            println!(
                "  {:<8} {:<12} {}",
                entry.operation.as_str(),
                resource_type,
                entry.id
            );
        }
    }
}
