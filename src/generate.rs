//! End-to-end generation: manifest text in, substituted manifest text out.

use crate::backends::{build_backend, SecretBackend};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest;
use crate::template::{Template, TemplateSettings};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Substitute every document in `input` using the configured backend.
pub async fn generate(input: &str, config: &Config) -> Result<String> {
    let settings = TemplateSettings::from_config(config)?;
    let backend = build_backend(&config.backend)?;
    generate_documents(input, backend.as_ref(), &settings).await
}

/// Substitute every document in `input` with an explicit backend.
///
/// Documents are processed in order; the first failure aborts the run.
pub async fn generate_documents(
    input: &str,
    backend: &dyn SecretBackend,
    settings: &TemplateSettings,
) -> Result<String> {
    let documents = manifest::parse_documents(input)?;
    let mut rendered = Vec::with_capacity(documents.len());

    for document in documents {
        let mut template = Template::new(document, backend, settings).await?;
        template.replace()?;
        rendered.push(template.to_yaml()?);
    }

    info!("Generated {} document(s)", rendered.len());
    Ok(manifest::join_documents(&rendered))
}

/// Read manifest text from a file, a directory, or stdin (`-`).
///
/// Directory entries ending in `.yaml` or `.yml` are read in name order and
/// joined into a single stream.
pub fn read_inputs(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = Path::new(path);
    if !path.is_dir() {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let file = entry?.path();
        let is_manifest = file
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_manifest && file.is_file() {
            files.push(file);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(Error::Parse(format!(
            "no .yaml or .yml files in {}",
            path.display()
        )));
    }

    let mut streams = Vec::with_capacity(files.len());
    for file in &files {
        debug!("Reading {}", file.display());
        let text = std::fs::read_to_string(file)?;
        streams.push(text.trim_end().to_string());
    }
    Ok(streams.join("\n---\n"))
}
