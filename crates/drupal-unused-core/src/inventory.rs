//! Installed package inventory
//!
//! Composer records every installed package in `vendor/composer/installed.json`.
//! Composer 1 writes a bare array, Composer 2 wraps it in `{"packages": [...]}`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DrupalUnusedError, Result};
use crate::package::{InventoryEntry, PackageName, DRUPAL_MODULE_TYPE};

const INSTALLED_JSON: &str = "composer/installed.json";

/// Source of installed packages, in install order
pub trait PackageInventory {
    fn list_all(&self) -> Result<Vec<InventoryEntry>>;
}

impl PackageInventory for Vec<InventoryEntry> {
    fn list_all(&self) -> Result<Vec<InventoryEntry>> {
        Ok(self.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstalledJson {
    V2 { packages: Vec<InventoryEntry> },
    V1(Vec<InventoryEntry>),
}

/// Inventory backed by Composer's `installed.json`
#[derive(Debug, Clone)]
pub struct InstalledJsonInventory {
    path: PathBuf,
}

impl InstalledJsonInventory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Inventory of the given vendor directory
    pub fn from_vendor_dir(vendor_dir: &Path) -> Self {
        Self::new(vendor_dir.join(INSTALLED_JSON))
    }
}

impl PackageInventory for InstalledJsonInventory {
    fn list_all(&self) -> Result<Vec<InventoryEntry>> {
        if !self.path.exists() {
            return Err(DrupalUnusedError::InventoryNotFound {
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path)?;
        let installed: InstalledJson =
            serde_json::from_str(&content).map_err(|e| DrupalUnusedError::ConfigParse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        Ok(match installed {
            InstalledJson::V2 { packages } => packages,
            InstalledJson::V1(packages) => packages,
        })
    }
}

/// Installed extension packages, in inventory order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstalledPackages {
    pub packages: Vec<PackageName>,
    /// Names of matching type that could not be split into vendor/name
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub malformed: Vec<String>,
}

/// Filters the inventory down to Drupal extension packages
#[derive(Debug, Clone)]
pub struct InstalledPackageLister<I> {
    inventory: I,
    package_types: Vec<String>,
}

impl<I: PackageInventory> InstalledPackageLister<I> {
    /// Lister for `drupal-module` packages
    pub fn new(inventory: I) -> Self {
        Self {
            inventory,
            package_types: vec![DRUPAL_MODULE_TYPE.to_string()],
        }
    }

    /// Replace the accepted package types
    pub fn package_types(mut self, types: Vec<String>) -> Self {
        self.package_types = types;
        self
    }

    /// Installed packages of an accepted type, with vendor prefix parsed off.
    ///
    /// Entries whose name lacks a vendor separator are skipped and recorded
    /// in [`InstalledPackages::malformed`].
    pub fn get_installed_drupal_packages(&self) -> Result<InstalledPackages> {
        let mut installed = InstalledPackages::default();

        for entry in self.inventory.list_all()? {
            if !self.package_types.iter().any(|t| *t == entry.package_type) {
                continue;
            }

            match entry.name.parse::<PackageName>() {
                Ok(name) => installed.packages.push(name),
                Err(e) => {
                    tracing::warn!("skipping inventory entry: {}", e);
                    installed.malformed.push(entry.name);
                }
            }
        }

        Ok(installed)
    }
}
