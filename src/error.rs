//! Error types shared by the substitution engine, the backends and the CLI.

use std::fmt;
use thiserror::Error;

/// Top-level error returned by library operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The input could not be read as a manifest document.
    #[error("could not parse manifest: {0}")]
    Parse(String),

    /// The secret backend failed; no substitution was attempted.
    #[error("could not fetch secrets at '{path}': {reason}")]
    SecretFetch { path: String, reason: String },

    /// One or more placeholders could not be replaced.
    #[error(transparent)]
    Replacement(#[from] ReplacementFailure),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not serialize manifest: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A failure confined to a single string leaf.
///
/// These never abort a traversal; they are collected and reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    #[error("could not find replacement for placeholder '{key}'")]
    Unresolved { key: String },

    #[error("malformed placeholder {token:?}: {reason}")]
    Malformed { token: String, reason: String },

    #[error("modifier '{modifier}' failed for placeholder '{key}': {reason}")]
    Modifier {
        key: String,
        modifier: String,
        reason: String,
    },
}

/// The part of a document a leaf error was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Metadata,
    StringData,
    Data,
    /// Any resource kind without section-specific handling.
    Resource,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Metadata => "metadata",
            Section::StringData => "stringData",
            Section::Data => "data",
            Section::Resource => "resource",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-leaf error labeled with where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{section} at '{path}': {error}")]
pub struct LeafError {
    pub section: Section,
    /// Dotted path of the leaf inside the document (`metadata.labels.app`).
    pub path: String,
    pub error: PlaceholderError,
}

/// Every placeholder failure recorded during one `replace` pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementFailure {
    pub kind: String,
    pub failures: Vec<LeafError>,
}

impl ReplacementFailure {
    /// Failures recorded for one section, in traversal order.
    pub fn in_section(&self, section: Section) -> impl Iterator<Item = &LeafError> {
        self.failures.iter().filter(move |f| f.section == section)
    }
}

impl fmt::Display for ReplacementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not replace all placeholders in {} ({} error(s))",
            self.kind,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ReplacementFailure {}
