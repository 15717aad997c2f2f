//! Sample catalog content and snapshot archive builders.
//!
//! Provides realistic payloads for every resource type, shaped the way
//! the catalog delivers them: standard types nest the content under
//! `document`, IoC payloads are the document itself.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use ctisync_model::{ResourceType, SpaceName};
use ctisync_store::ContentStores;
use serde_json::{json, Value};
use zip::write::FileOptions;
use zip::ZipWriter;

/// A representative document for the given resource type.
///
/// The policy references `integration-1` and the integration lists the
/// other `<type>-1` assets, so the documents seeded by
/// [`populated_stores`] form a complete policy graph.
pub fn sample_document(resource_type: ResourceType, id: &str) -> Value {
    match resource_type {
        ResourceType::Integration => json!({
            "id": id,
            "title": "Suspicious authentication activity",
            "decoders": ["decoder-1"],
            "kvdbs": ["kvdb-1"],
            "rules": ["rule-1"]
        }),
        ResourceType::Decoder => json!({
            "id": id,
            "name": "decoder/auth-log/0",
            "parents": ["decoder/syslog/0"],
            "check": "$wazuh.origin == 'auth'",
            "normalize": [{"map": [{"event.kind": "event"}]}]
        }),
        ResourceType::Rule => json!({
            "id": id,
            "name": "Multiple failed logins",
            "severity": 7,
            "mitre": {"tactic": "credential-access", "technique": "T1110"}
        }),
        ResourceType::Kvdb => json!({
            "id": id,
            "title": "Known scanner addresses",
            "content": {"198.51.100.7": {"source": "honeypot"}}
        }),
        ResourceType::Policy => json!({
            "id": id,
            "title": "Default detection policy",
            "integrations": ["integration-1"]
        }),
        ResourceType::Ioc => json!({
            "type": "ioc",
            "id": id,
            "indicator": "203.0.113.9",
            "tlp": "amber"
        }),
        ResourceType::Filter => json!({
            "id": id,
            "name": "filter/allow-internal/0",
            "definition": {"allow": ["10.0.0.0/8"]}
        }),
    }
}

/// A catalog payload for the given resource type.
pub fn sample_payload(resource_type: ResourceType, id: &str) -> Value {
    let document = sample_document(resource_type, id);
    match resource_type {
        ResourceType::Ioc => document,
        _ => json!({"type": resource_type.as_str(), "document": document}),
    }
}

/// A snapshot NDJSON line for the given resource type.
pub fn snapshot_line(resource_type: ResourceType, id: &str) -> Value {
    json!({"payload": sample_payload(resource_type, id)})
}

/// Writes a snapshot archive with one NDJSON file per `(name, lines)`
/// pair and returns its path.
pub fn write_snapshot_zip(path: &Path, files: &[(&str, Vec<Value>)]) -> PathBuf {
    let file = File::create(path).expect("Failed to create snapshot archive");
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default();
    for (name, lines) in files {
        writer
            .start_file(*name, options)
            .expect("Failed to start archive entry");
        for line in lines {
            writeln!(writer, "{line}").expect("Failed to write snapshot line");
        }
    }
    writer.finish().expect("Failed to finish snapshot archive");
    path.to_path_buf()
}

/// Content stores with one document of every resource type in draft.
///
/// Ids follow the `<type>-1` pattern (`rule-1`, `decoder-1`, ...).
pub fn populated_stores() -> ContentStores {
    let stores = ContentStores::in_memory();
    let draft = stores.for_space(SpaceName::Draft);
    for resource_type in ResourceType::ALL {
        let id = format!("{resource_type}-1");
        draft
            .create(resource_type, &id, &sample_payload(resource_type, &id))
            .expect("Failed to seed draft store");
    }
    stores
}
