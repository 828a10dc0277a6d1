//! Enabled extension aggregation
//!
//! The enabled set is the union of:
//!
//! - the `module` and `theme` keys of `core.extension.yml`
//! - the `module` keys of every `config_split.config_split.*.yml` in the
//!   same directory
//!
//! Split files only ever add names. Order of processing does not matter.

use std::collections::HashSet;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::document::{matching_files, StructuredFileReader, YamlFileReader};
use crate::error::{DrupalUnusedError, Result};
use crate::package::ExtensionName;

/// Base extension document inside a config sync directory
pub const CORE_EXTENSION_FILE: &str = "core.extension.yml";

/// Default glob for config split documents
pub const DEFAULT_SPLIT_PATTERN: &str = "config_split.config_split.*.yml";

const MODULE_KEY: &str = "module";
const THEME_KEY: &str = "theme";

/// Set of extension names declared active by configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledExtensionSet {
    names: HashSet<ExtensionName>,
}

impl EnabledExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Add a name. Returns false if it was already present.
    pub fn insert(&mut self, name: impl Into<ExtensionName>) -> bool {
        self.names.insert(name.into())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in lexical order
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl<S: Into<ExtensionName>> FromIterator<S> for EnabledExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<ExtensionName>> Extend<S> for EnabledExtensionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for EnabledExtensionSet {
    type Item = ExtensionName;
    type IntoIter = std::collections::hash_set::IntoIter<ExtensionName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_iter()
    }
}

impl Serialize for EnabledExtensionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}

/// Reads enabled extensions out of a Drupal config sync directory
#[derive(Debug, Clone)]
pub struct ConfigReader<R = YamlFileReader> {
    reader: R,
    split_pattern: String,
}

impl ConfigReader<YamlFileReader> {
    pub fn new() -> Self {
        Self::with_reader(YamlFileReader)
    }
}

impl Default for ConfigReader<YamlFileReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: StructuredFileReader> ConfigReader<R> {
    pub fn with_reader(reader: R) -> Self {
        Self {
            reader,
            split_pattern: DEFAULT_SPLIT_PATTERN.to_string(),
        }
    }

    /// Override the glob used to find split documents
    pub fn split_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.split_pattern = pattern.into();
        self
    }

    /// Union of base and split-enabled extensions.
    ///
    /// Fails with `ConfigNotFound` if `config_dir` or its
    /// `core.extension.yml` is missing.
    pub fn get_all_enabled_extensions(&self, config_dir: &Path) -> Result<EnabledExtensionSet> {
        if !config_dir.is_dir() {
            return Err(DrupalUnusedError::ConfigNotFound {
                path: config_dir.to_path_buf(),
            });
        }

        let mut enabled = self.get_enabled_extensions(config_dir)?;
        let base_count = enabled.len();
        enabled.extend(self.get_config_split_modules(config_dir)?);

        tracing::debug!(
            base = base_count,
            total = enabled.len(),
            "collected enabled extensions from {}",
            config_dir.display()
        );

        Ok(enabled)
    }

    /// `module` and `theme` keys of `core.extension.yml`
    pub fn get_enabled_extensions(&self, config_dir: &Path) -> Result<EnabledExtensionSet> {
        let document = self.reader.parse(&config_dir.join(CORE_EXTENSION_FILE))?;

        let mut enabled = EnabledExtensionSet::new();
        enabled.extend(document.section_keys(MODULE_KEY));
        enabled.extend(document.section_keys(THEME_KEY));
        Ok(enabled)
    }

    /// `module` keys of every split document. No matches is not an error.
    pub fn get_config_split_modules(&self, config_dir: &Path) -> Result<EnabledExtensionSet> {
        let mut modules = EnabledExtensionSet::new();

        for file in matching_files(config_dir, &self.split_pattern)? {
            let document = self.reader.parse(&file)?;
            let keys = document.section_keys(MODULE_KEY);
            tracing::debug!("{} enables {} module(s)", file.display(), keys.len());
            modules.extend(keys);
        }

        Ok(modules)
    }
}
