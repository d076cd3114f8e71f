//! File secret backend.
//!
//! Reads a YAML or JSON file whose top-level keys are secret paths:
//!
//! ```yaml
//! secret/configmap:
//!   greeting: hello
//! secret/secret:
//!   token: abc
//! secret/secret@2:
//!   token: older
//! ```
//!
//! A pinned version is looked up under `path@version`.

use super::SecretBackend;
use crate::config::read_structured_file;
use crate::error::{Error, Result};
use crate::placeholder::SecretMap;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Serves secrets from a file loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct FileBackend {
    entries: HashMap<String, SecretMap>,
}

impl FileBackend {
    pub fn load(path: &Path) -> Result<Self> {
        let entries: HashMap<String, SecretMap> =
            read_structured_file(path).map_err(|e| Error::SecretFetch {
                path: path.display().to_string(),
                reason: format!("{e:#}"),
            })?;
        debug!(
            "Loaded {} secret path(s) from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    pub fn from_entries(entries: HashMap<String, SecretMap>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl SecretBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_secrets(&self, path: &str, version: Option<&str>) -> Result<SecretMap> {
        let key = match version {
            Some(version) => format!("{path}@{version}"),
            None => path.to_string(),
        };
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::SecretFetch {
                path: key,
                reason: "no secrets stored at this path".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn serves_paths_and_versions() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("secrets.yaml");
        std::fs::write(
            &file,
            "secret/secret:\n  token: abc\n  port: 5432\nsecret/secret@1:\n  token: old\n",
        )
        .unwrap();

        let backend = FileBackend::load(&file).unwrap();
        let latest = backend.get_secrets("secret/secret", None).await.unwrap();
        assert_eq!(latest["token"], json!("abc"));
        assert_eq!(latest["port"], json!(5432));

        let pinned = backend.get_secrets("secret/secret", Some("1")).await.unwrap();
        assert_eq!(pinned["token"], json!("old"));
    }

    #[tokio::test]
    async fn unknown_path_is_fetch_failure() {
        let backend = FileBackend::default();
        let err = backend.get_secrets("secret/nope", Some("3")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::SecretFetch { ref path, .. } if path == "secret/nope@3"
        ));
    }

    #[test]
    fn rejects_non_map_entries() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("secrets.json");
        std::fs::write(&file, r#"{"secret/secret": "not a map"}"#).unwrap();
        assert!(matches!(
            FileBackend::load(&file),
            Err(Error::SecretFetch { .. })
        ));
    }
}
