use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::composer::DEFAULT_COMPOSER_BINARY;
use crate::error::{DrupalUnusedError, Result};
use crate::extensions::DEFAULT_SPLIT_PATTERN;
use crate::package::DRUPAL_MODULE_TYPE;

const CONFIG_FILE: &str = "drupal-unused.toml";

/// Drupal's conventional config sync directory
pub const DEFAULT_CONFIG_DIR: &str = "config/sync";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# drupal-unused configuration file
# Location: <project>/drupal-unused.toml

[scan]
# Drupal config sync directory, relative to the project root
config_dir = "config/sync"

# Composer package types treated as Drupal extensions
# Example: package_types = ["drupal-module", "drupal-theme"]
package_types = ["drupal-module"]

# Glob for config split documents inside config_dir
split_pattern = "config_split.config_split.*.yml"

[composer]
# Composer executable used for removal
binary = "composer"

# Set to false to run `composer update --no-dev`
dev_mode = true
"#;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub composer: ComposerConfig,
}

/// Scan-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    #[serde(default = "default_package_types")]
    pub package_types: Vec<String>,

    #[serde(default = "default_split_pattern")]
    pub split_pattern: String,
}

/// Removal-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposerConfig {
    #[serde(default = "default_binary")]
    pub binary: String,

    #[serde(default = "default_dev_mode")]
    pub dev_mode: bool,
}

fn default_config_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_DIR)
}

fn default_package_types() -> Vec<String> {
    vec![DRUPAL_MODULE_TYPE.to_string()]
}

fn default_split_pattern() -> String {
    DEFAULT_SPLIT_PATTERN.to_string()
}

fn default_binary() -> String {
    DEFAULT_COMPOSER_BINARY.to_string()
}

fn default_dev_mode() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            package_types: default_package_types(),
            split_pattern: default_split_pattern(),
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            dev_mode: default_dev_mode(),
        }
    }
}

impl Config {
    /// Load config from project directory
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| DrupalUnusedError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to project directory
    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let path = project_dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(project_dir: &Path) -> Result<PathBuf> {
        let path = project_dir.join(CONFIG_FILE);
        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }
        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        self.list()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "scan.config_dir" => self.scan.config_dir = PathBuf::from(value.trim()),
            "scan.package_types" => self.scan.package_types = parse_string_list(value),
            "scan.split_pattern" => self.scan.split_pattern = value.trim().to_string(),
            "composer.binary" => self.composer.binary = value.trim().to_string(),
            "composer.dev_mode" => {
                self.composer.dev_mode = parse_bool(value).ok_or_else(|| {
                    DrupalUnusedError::ConfigParse {
                        path: PathBuf::from(CONFIG_FILE),
                        message: format!("composer.dev_mode expects true or false, got '{}'", value),
                    }
                })?
            }
            _ => {
                return Err(DrupalUnusedError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "scan.config_dir".to_string(),
                self.scan.config_dir.display().to_string(),
            ),
            (
                "scan.package_types".to_string(),
                format!("{:?}", self.scan.package_types),
            ),
            (
                "scan.split_pattern".to_string(),
                self.scan.split_pattern.clone(),
            ),
            ("composer.binary".to_string(), self.composer.binary.clone()),
            (
                "composer.dev_mode".to_string(),
                self.composer.dev_mode.to_string(),
            ),
        ]
    }
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
