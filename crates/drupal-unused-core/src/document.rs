//! Structured configuration documents
//!
//! Drupal exports configuration as YAML. The reconciliation engine only ever
//! needs "the keys of the mapping under `<section>`", so documents are exposed
//! through [`ConfigDocument::section_keys`], which treats an absent or
//! non-mapping section as empty instead of assuming it exists.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml_ng::{Mapping, Value};

use crate::error::{DrupalUnusedError, Result};

/// Loads a structured document from disk.
pub trait StructuredFileReader {
    /// Parse the file at `path`.
    ///
    /// Fails with `ConfigNotFound` when the file does not exist and with
    /// `ConfigParse` when it is not a valid mapping document.
    fn parse(&self, path: &Path) -> Result<ConfigDocument>;
}

/// YAML-backed [`StructuredFileReader`]
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFileReader;

impl StructuredFileReader for YamlFileReader {
    fn parse(&self, path: &Path) -> Result<ConfigDocument> {
        if !path.is_file() {
            return Err(DrupalUnusedError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        ConfigDocument::from_yaml_str(&content).map_err(|message| DrupalUnusedError::ConfigParse {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// A parsed top-level mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: Mapping,
}

impl ConfigDocument {
    /// Parse YAML text. An empty document is an empty mapping.
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_yaml_ng::from_str(content).map_err(|e| e.to_string())?;
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Ok(Self::default()),
            other => Err(format!(
                "expected a mapping at the document root, found {}",
                value_kind(&other)
            )),
        }
    }

    /// Keys of the mapping stored under `section`, in document order.
    ///
    /// Returns an empty list when the section is missing, null, or not a
    /// mapping.
    pub fn section_keys(&self, section: &str) -> Vec<String> {
        match self.root.get(section) {
            Some(Value::Mapping(entries)) => entries
                .keys()
                .filter_map(|key| key.as_str().map(|s| s.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Files in `dir` whose name matches `pattern`, sorted by path.
///
/// Non-recursive. Entries that cannot be read are logged and skipped.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );

    let paths = glob::glob(&full).map_err(|e| DrupalUnusedError::ConfigParse {
        path: PathBuf::from(pattern),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!("skipping unreadable entry {}: {}", e.path().display(), e),
        }
    }
    files.sort();
    Ok(files)
}
