//! Status command implementation.

use ctisync_engine::{CatalogClient, HttpCatalogClient, SyncConfig};
use serde::Serialize;

/// The remote consumer record as reported by the catalog.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Catalog context.
    pub context: String,
    /// Consumer name.
    pub name: String,
    /// Offset the remote record carries.
    pub offset: u64,
    /// Highest offset the catalog has published.
    pub last_offset: u64,
    /// Whether changes are waiting to be pulled.
    pub pending_changes: bool,
    /// Snapshot archive link, when the catalog offers one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_snapshot_link: Option<String>,
}

/// Runs the status command.
pub fn run(config: SyncConfig, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpCatalogClient::new(&config)?;
    let remote = client.get_catalog()?;

    let report = StatusReport {
        context: remote.context.clone(),
        name: remote.name.clone(),
        offset: remote.offset,
        last_offset: remote.last_offset,
        pending_changes: remote.has_pending_changes(),
        last_snapshot_link: remote.last_snapshot_link,
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Context:     {}", report.context);
        println!("Consumer:    {}", report.name);
        println!("Offset:      {}", report.offset);
        println!("Last offset: {}", report.last_offset);
        println!("Pending:     {}", report.pending_changes);
        match &report.last_snapshot_link {
            Some(link) => println!("Snapshot:    {link}"),
            None => println!("Snapshot:    (none)"),
        }
    }

    Ok(())
}
