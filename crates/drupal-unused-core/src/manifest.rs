//! Project manifest (`composer.json`)
//!
//! Only `require` / `require-dev` are rewritten. Every other field, and the
//! order of keys, is left as found.

use std::fs;
use std::path::{Path, PathBuf};

use serde::ser::Serialize;
use serde_json::{Map, Value};

use crate::error::{DrupalUnusedError, Result};

pub const MANIFEST_FILE: &str = "composer.json";

const REQUIRE_KEY: &str = "require";
const REQUIRE_DEV_KEY: &str = "require-dev";
const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Declared requirements: package name to version constraint, in file order.
///
/// Lookups ignore ASCII case, as Composer does for package names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    entries: Vec<(String, String)>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, package: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(package))
            .map(|(_, constraint)| constraint.as_str())
    }

    pub fn contains(&self, package: &str) -> bool {
        self.get(package).is_some()
    }

    /// Insert or replace, keeping the original position on replace
    pub fn insert(&mut self, package: impl Into<String>, constraint: impl Into<String>) {
        let package = package.into();
        let constraint = constraint.into();
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&package))
        {
            Some(entry) => entry.1 = constraint,
            None => self.entries.push((package, constraint)),
        }
    }

    /// Remove a package. Returns whether it was present.
    pub fn remove(&mut self, package: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|(name, _)| !name.eq_ignore_ascii_case(package));
        self.entries.len() < before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Requirements {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut requirements = Self::new();
        for (package, constraint) in iter {
            requirements.insert(package, constraint);
        }
        requirements
    }
}

/// In-memory copy of `composer.json`
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    path: PathBuf,
    data: Map<String, Value>,
}

impl ProjectManifest {
    /// Load `composer.json` from a project directory
    pub fn load(project_dir: &Path) -> Result<Self> {
        Self::load_file(&project_dir.join(MANIFEST_FILE))
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DrupalUnusedError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| DrupalUnusedError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        match value {
            Value::Object(data) => Ok(Self {
                path: path.to_path_buf(),
                data,
            }),
            _ => Err(DrupalUnusedError::ConfigParse {
                path: path.to_path_buf(),
                message: "composer.json must be a JSON object".to_string(),
            }),
        }
    }

    /// `require` (or `require-dev` when `dev`) as a mapping
    pub fn requirements(&self, dev: bool) -> Requirements {
        let Some(Value::Object(entries)) = self.data.get(requirement_key(dev)) else {
            return Requirements::new();
        };

        entries
            .iter()
            .map(|(name, constraint)| {
                let constraint = match constraint {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), constraint)
            })
            .collect()
    }

    /// Replace `require` (or `require-dev`). An empty mapping does not
    /// create a section that was absent.
    pub fn set_requirements(&mut self, dev: bool, requirements: &Requirements) {
        let key = requirement_key(dev);
        if requirements.is_empty() && !self.data.contains_key(key) {
            return;
        }

        let entries: Map<String, Value> = requirements
            .iter()
            .map(|(name, constraint)| (name.to_string(), Value::String(constraint.to_string())))
            .collect();

        match self.data.get_mut(key) {
            Some(slot) => *slot = Value::Object(entries),
            None => {
                self.data.insert(key.to_string(), Value::Object(entries));
            }
        }
    }

    /// Composer's vendor directory, honouring `config.vendor-dir`
    pub fn vendor_dir(&self) -> PathBuf {
        let vendor = self
            .data
            .get("config")
            .and_then(|c| c.get("vendor-dir"))
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_VENDOR_DIR);

        let project_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        project_dir.join(vendor)
    }

    /// Write back with Composer's four-space indentation
    pub fn save(&self) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.data
            .serialize(&mut serializer)
            .map_err(|e| DrupalUnusedError::ConfigParse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        buf.push(b'\n');

        fs::write(&self.path, buf)?;
        Ok(())
    }
}

fn requirement_key(dev: bool) -> &'static str {
    if dev {
        REQUIRE_DEV_KEY
    } else {
        REQUIRE_KEY
    }
}
