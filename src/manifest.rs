//! Reading and writing manifest text.

use crate::error::{Error, Result};
use crate::template::{ResourceKind, Value};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Document separator used when writing several manifests.
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Parse a (possibly multi-document) YAML stream.
///
/// Empty documents are skipped. Every other document must be a map.
pub fn parse_documents(text: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();

    for (idx, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = serde_json::Value::deserialize(document)
            .map_err(|e| Error::Parse(format!("document {}: {e}", idx + 1)))?;

        match value {
            serde_json::Value::Null => continue,
            serde_json::Value::Object(_) => documents.push(Value::from(value)),
            _ => {
                return Err(Error::Parse(format!(
                    "document {} is not a mapping",
                    idx + 1
                )))
            }
        }
    }

    Ok(documents)
}

/// The resource kind declared by a document.
pub fn document_kind(document: &Value) -> Result<ResourceKind> {
    if document.as_map().is_none() {
        return Err(Error::Parse("document is not a mapping".to_string()));
    }
    document
        .get("kind")
        .and_then(Value::as_str)
        .filter(|kind| !kind.is_empty())
        .map(ResourceKind::parse)
        .ok_or_else(|| Error::Parse("document has no 'kind'".to_string()))
}

/// `metadata.annotations`, when present.
pub fn annotations(document: &Value) -> Option<&BTreeMap<String, Value>> {
    document.get("metadata")?.get("annotations")?.as_map()
}

/// `metadata.name`, when present.
pub fn name(document: &Value) -> Option<&str> {
    document.get("metadata")?.get("name")?.as_str()
}

/// Serialize one document as YAML.
pub fn to_yaml(document: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(&document.to_json())?)
}

/// Join serialized documents into one stream.
pub fn join_documents(documents: &[String]) -> String {
    documents.join(DOCUMENT_SEPARATOR)
}
