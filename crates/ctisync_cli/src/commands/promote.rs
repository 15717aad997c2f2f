//! Promote command implementation.

use std::sync::Arc;

use ctisync_engine::{HttpCatalogClient, SpacePromoter, SyncConfig, Synchronizer};
use ctisync_model::SpaceName;
use ctisync_store::{ContentStores, InMemoryOffsetTracker};
use serde::Serialize;

/// Summary of an executed promotion.
#[derive(Debug, Serialize)]
pub struct PromoteSummary {
    /// The promoted source space.
    pub source: String,
    /// The space the content was copied into.
    pub target: String,
    /// Integration entries applied.
    pub integrations: usize,
    /// Decoder entries applied.
    pub decoders: usize,
    /// Rule entries applied.
    pub rules: usize,
    /// Kvdb entries applied.
    pub kvdbs: usize,
    /// Filter entries applied.
    pub filters: usize,
    /// Policy entries applied.
    pub policy: usize,
}

/// Runs the promote command: one sync pass, preview, then execution.
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
    promoter.promote(&diff)?;

    let target = space
        .promote()
        .map(|target| target.to_string())
        .unwrap_or_default();
    let summary = PromoteSummary {
        source: space.to_string(),
        target,
        integrations: diff.changes.integrations.len(),
        decoders: diff.changes.decoders.len(),
        rules: diff.changes.rules.len(),
        kvdbs: diff.changes.kvdbs.len(),
        filters: diff.changes.filters.len(),
        policy: diff.changes.policy.len(),
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Promoted {} -> {}", summary.source, summary.target);
        println!("  integrations {}", summary.integrations);
        println!("  decoders     {}", summary.decoders);
        println!("  rules        {}", summary.rules);
        println!("  kvdbs        {}", summary.kvdbs);
        println!("  filters      {}", summary.filters);
        println!("  policy       {}", summary.policy);
    }

    Ok(())
}
