//! Manifest templates: one parsed document plus the secrets it needs.
//!
//! Substitution happens in three steps:
//! 1. **Scan**: check once whether the document holds any placeholder
//! 2. **Fetch**: if so, load the secret mapping for the document's path
//! 3. **Replace**: walk each section with the policy its kind requires

pub mod policy;
pub mod value;
pub mod walker;

pub use policy::{EncodingPolicy, PolicyContext, ResourceKind, Scope, SectionRule};
pub use value::Value;
pub use walker::{walk, Leaf, Replacement, Walked};

use crate::backends::SecretBackend;
use crate::config::{Config, UnresolvedData};
use crate::error::{LeafError, ReplacementFailure, Result};
use crate::manifest;
use crate::placeholder::{Matcher, SecretMap};
use tracing::{debug, info, warn};

/// Annotation that overrides the secret path derived from the kind.
pub const PATH_ANNOTATION: &str = "secret-inject/path";

/// Annotation that pins the secret version.
pub const VERSION_ANNOTATION: &str = "secret-inject/kv-version";

/// Settings shared by every template of a run.
#[derive(Debug, Clone)]
pub struct TemplateSettings {
    /// Prefix of the kind-derived secret path (`{prefix}/{kind}`).
    pub path_prefix: String,
    /// Version used when a document does not pin one.
    pub kv_version: Option<String>,
    pub matcher: Matcher,
    pub unresolved_data: UnresolvedData,
}

impl TemplateSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            path_prefix: config.path_prefix.clone(),
            kv_version: config.kv_version.clone(),
            matcher: Matcher::new(&config.placeholder.open, &config.placeholder.close)?,
            unresolved_data: config.unresolved_data,
        })
    }
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            path_prefix: crate::config::DEFAULT_PATH_PREFIX.to_string(),
            kv_version: None,
            matcher: Matcher::default(),
            unresolved_data: UnresolvedData::default(),
        }
    }
}

/// A manifest document being prepared for the cluster.
#[derive(Debug, Clone)]
pub struct Template {
    kind: ResourceKind,
    data: Value,
    replaceable: bool,
    secrets: Option<SecretMap>,
    matcher: Matcher,
    unresolved_data: UnresolvedData,
}

impl Template {
    /// Build a template, fetching secrets only when the document has
    /// placeholders.
    pub async fn new(
        document: Value,
        backend: &dyn SecretBackend,
        settings: &TemplateSettings,
    ) -> Result<Self> {
        let kind = manifest::document_kind(&document)?;
        let replaceable = settings.matcher.contains_in(&document);

        let secrets = if replaceable {
            let (path, version) = secret_location(&document, &kind, settings);
            debug!(
                "Fetching secrets for {kind} from '{path}' via {} backend",
                backend.name()
            );
            Some(backend.get_secrets(&path, version.as_deref()).await?)
        } else {
            debug!("No placeholders in {kind}, skipping secret fetch");
            None
        };

        Ok(Self {
            kind,
            data: document,
            replaceable,
            secrets,
            matcher: settings.matcher.clone(),
            unresolved_data: settings.unresolved_data,
        })
    }

    /// Build a template from secrets fetched elsewhere.
    ///
    /// The mapping is dropped when the document has no placeholders.
    pub fn with_secrets(
        document: Value,
        secrets: Option<SecretMap>,
        settings: &TemplateSettings,
    ) -> Result<Self> {
        let kind = manifest::document_kind(&document)?;
        let replaceable = settings.matcher.contains_in(&document);

        Ok(Self {
            kind,
            data: document,
            replaceable,
            secrets: secrets.filter(|_| replaceable),
            matcher: settings.matcher.clone(),
            unresolved_data: settings.unresolved_data,
        })
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    pub fn is_replaceable(&self) -> bool {
        self.replaceable
    }

    pub fn secrets(&self) -> Option<&SecretMap> {
        self.secrets.as_ref()
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Replace every placeholder in the document.
    ///
    /// All sections are walked even after failures; the error lists every
    /// placeholder that could not be replaced, labeled by section.
    pub fn replace(&mut self) -> std::result::Result<(), ReplacementFailure> {
        if !self.replaceable {
            return Ok(());
        }

        let ctx = PolicyContext {
            matcher: &self.matcher,
            secrets: self.secrets.as_ref(),
            unresolved_data: self.unresolved_data,
        };
        let rules = self.kind.rules();
        let mut failures = Vec::new();

        for rule in rules {
            let policy = |leaf: &Leaf<'_>| rule.policy.apply(leaf, &ctx);
            let mut record = |walked: Walked| {
                failures.extend(walked.errors.into_iter().map(|e| LeafError {
                    section: rule.section,
                    path: e.path,
                    error: e.error,
                }));
                walked.value
            };

            match rule.scope {
                Scope::Whole => {
                    let node = std::mem::take(&mut self.data);
                    self.data = record(walk(node, "", "", &policy));
                }
                Scope::Field(name) => {
                    let Value::Map(root) = &mut self.data else {
                        continue;
                    };
                    if let Some(slot) = root.get_mut(name).filter(|n| matches!(n, Value::Map(_))) {
                        let node = std::mem::take(slot);
                        *slot = record(walk(node, name, name, &policy));
                    }
                }
                Scope::Remainder => {
                    let Value::Map(root) = &mut self.data else {
                        continue;
                    };
                    for (key, slot) in root.iter_mut() {
                        if is_claimed(rules, key) {
                            continue;
                        }
                        let node = std::mem::take(slot);
                        *slot = record(walk(node, key, key, &policy));
                    }
                }
            }
        }

        if failures.is_empty() {
            info!("Replaced placeholders in {}", describe(&self.kind, &self.data));
            return Ok(());
        }

        warn!(
            "{} placeholder(s) could not be replaced in {}",
            failures.len(),
            describe(&self.kind, &self.data)
        );
        Err(ReplacementFailure {
            kind: self.kind.to_string(),
            failures,
        })
    }

    /// Serialize the document as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        manifest::to_yaml(&self.data)
    }
}

/// Secret path and version for a document.
///
/// The path annotation wins over `{prefix}/{kind}`; the version annotation
/// wins over the configured default.
pub fn secret_location(
    document: &Value,
    kind: &ResourceKind,
    settings: &TemplateSettings,
) -> (String, Option<String>) {
    let annotations = manifest::annotations(document);
    let annotation = |name: &str| {
        annotations
            .and_then(|a| a.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let path = annotation(PATH_ANNOTATION).unwrap_or_else(|| {
        format!(
            "{}/{}",
            settings.path_prefix.trim_end_matches('/'),
            kind.as_str().to_lowercase()
        )
    });
    let version = annotation(VERSION_ANNOTATION).or_else(|| settings.kv_version.clone());

    (path, version)
}

fn is_claimed(rules: &[SectionRule], key: &str) -> bool {
    rules
        .iter()
        .any(|rule| matches!(rule.scope, Scope::Field(name) if name == key))
}

fn describe(kind: &ResourceKind, data: &Value) -> String {
    match manifest::name(data) {
        Some(name) => format!("{kind} '{name}'"),
        None => kind.to_string(),
    }
}
