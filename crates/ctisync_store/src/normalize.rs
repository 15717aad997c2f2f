//! Payload normalization.
//!
//! Inbound catalog payloads are normalized before hashing and
//! persistence: internal metadata is stripped, `related` entries are
//! renamed to their stable key, decoder documents get a serialized YAML
//! rule-engine form, and the content hash is recomputed from the
//! normalized document. Payloads may arrive with the content nested
//! under `document` or (IoC records) as the bare object itself; both
//! normalize to the same persisted shape.

use ctisync_model::{ContentDocument, ResourceType, SpaceInfo, SpaceName};
use ctisync_patch::content_hash;
use serde_json::{Map, Value};
use tracing::warn;

/// Keys emitted first in a decoder's YAML form, in this order. Remaining
/// keys follow in document order.
const DECODER_KEY_ORDER: [&str; 8] = [
    "name",
    "metadata",
    "parents",
    "definitions",
    "check",
    "parse|event.original",
    "parse|message",
    "normalize",
];

/// Normalize an inbound payload into the persisted document shape.
///
/// The content hash is always recomputed here; decoder YAML synthesis
/// failure is logged and leaves the `decoder` field unset.
pub fn normalize_payload(
    space: SpaceName,
    resource_type: ResourceType,
    payload: &Value,
) -> ContentDocument {
    let mut document = match payload.get("document") {
        Some(doc) if doc.is_object() => doc.clone(),
        // No wrapper: the payload is the document (IoC records).
        _ => payload.clone(),
    };
    sanitize_document(&mut document);

    let hash = content_hash(&document);
    let mut decoder = payload
        .get("decoder")
        .and_then(Value::as_str)
        .map(str::to_string);

    if resource_type == ResourceType::Decoder {
        match decoder_yaml(&document) {
            Ok(yaml) => decoder = yaml,
            Err(err) => {
                warn!(error = %err, "decoder yaml synthesis failed, field left unset");
                decoder = None;
            }
        }
    }

    let mut content = ContentDocument::new(resource_type, document, SpaceInfo::new(space, hash));
    content.decoder = decoder;
    content
}

/// Strip internal metadata and normalize `related` entries, in place.
pub fn sanitize_document(document: &mut Value) {
    let Some(map) = document.as_object_mut() else {
        return;
    };

    if let Some(Value::Object(metadata)) = map.get_mut("metadata") {
        metadata.shift_remove("custom_fields");
        metadata.shift_remove("dataset");
    }

    match map.get_mut("related") {
        Some(Value::Object(related)) => rename_sigma_id(related),
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(related) = item.as_object_mut() {
                    rename_sigma_id(related);
                }
            }
        }
        _ => {}
    }
}

fn rename_sigma_id(related: &mut Map<String, Value>) {
    if let Some(value) = related.shift_remove("sigma_id") {
        related.insert("id".to_string(), value);
    }
}

/// Serialize a decoder document to its YAML rule-engine form.
///
/// Keys are emitted in [`DECODER_KEY_ORDER`], then all remaining keys in
/// document order. Returns `Ok(None)` for non-object documents.
pub fn decoder_yaml(document: &Value) -> Result<Option<String>, serde_yaml::Error> {
    let Some(map) = document.as_object() else {
        return Ok(None);
    };

    let mut ordered = Map::new();
    for key in DECODER_KEY_ORDER {
        if let Some(value) = map.get(key) {
            ordered.insert(key.to_string(), value.clone());
        }
    }
    for (key, value) in map {
        if !DECODER_KEY_ORDER.contains(&key.as_str()) {
            ordered.insert(key.clone(), value.clone());
        }
    }

    serde_yaml::to_string(&Value::Object(ordered)).map(Some)
}
