use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::DrupalUnusedError;

/// Package type Composer assigns to Drupal modules
pub const DRUPAL_MODULE_TYPE: &str = "drupal-module";

/// A bare Drupal extension name such as `views`
pub type ExtensionName = String;

/// A Composer package name split into `<vendor>/<extension>`.
///
/// Parsed once where names enter the system; everything downstream compares
/// on [`PackageName::extension`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName {
    pub vendor: String,
    pub extension: ExtensionName,
}

impl PackageName {
    pub fn new(vendor: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            extension: extension.into(),
        }
    }
}

impl FromStr for PackageName {
    type Err = DrupalUnusedError;

    /// Split on the first `/`. Both halves must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((vendor, extension)) if !vendor.is_empty() && !extension.is_empty() => {
                Ok(Self::new(vendor, extension))
            }
            _ => Err(DrupalUnusedError::MalformedPackageName {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vendor, self.extension)
    }
}

impl Serialize for PackageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One entry of the installed package inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub name: String,
    #[serde(rename = "type", default = "default_package_type")]
    pub package_type: String,
}

fn default_package_type() -> String {
    "library".to_string()
}

impl InventoryEntry {
    pub fn new(name: impl Into<String>, package_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package_type: package_type.into(),
        }
    }
}
