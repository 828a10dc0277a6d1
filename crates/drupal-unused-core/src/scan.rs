use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::document::{StructuredFileReader, YamlFileReader};
use crate::error::Result;
use crate::extensions::{ConfigReader, EnabledExtensionSet};
use crate::inventory::{InstalledPackageLister, InstalledPackages, PackageInventory};
use crate::package::PackageName;
use crate::resolver::resolve_unused;

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub config_dir: PathBuf,
    pub enabled: EnabledExtensionSet,
    pub installed: InstalledPackages,
    pub unused: Vec<PackageName>,
}

impl ScanResult {
    /// True when every installed package is enabled
    pub fn all_in_use(&self) -> bool {
        self.unused.is_empty()
    }
}

/// Reads configuration and inventory, then diffs them
pub struct Scanner<I, R = YamlFileReader> {
    config_reader: ConfigReader<R>,
    lister: InstalledPackageLister<I>,
}

impl<I: PackageInventory, R: StructuredFileReader> Scanner<I, R> {
    pub fn new(config_reader: ConfigReader<R>, lister: InstalledPackageLister<I>) -> Self {
        Self {
            config_reader,
            lister,
        }
    }

    /// Configuration is read first; if it fails nothing else is computed.
    pub fn scan(&self, config_dir: &Path) -> Result<ScanResult> {
        let enabled = self.config_reader.get_all_enabled_extensions(config_dir)?;
        let installed = self.lister.get_installed_drupal_packages()?;
        let unused = resolve_unused(&installed.packages, &enabled);

        tracing::debug!(
            enabled = enabled.len(),
            installed = installed.packages.len(),
            unused = unused.len(),
            "scan complete"
        );

        Ok(ScanResult {
            config_dir: config_dir.to_path_buf(),
            enabled,
            installed,
            unused,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DrupalUnusedError;
    use crate::package::InventoryEntry;
    use std::fs;
    use tempfile::TempDir;

    fn scanner(entries: Vec<InventoryEntry>) -> Scanner<Vec<InventoryEntry>> {
        Scanner::new(ConfigReader::new(), InstalledPackageLister::new(entries))
    }

    #[test]
    fn scan_reports_unused_in_inventory_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("core.extension.yml"),
            "module:\n  views: 0\n",
        )
        .unwrap();

        let result = scanner(vec![
            InventoryEntry::new("drupal/token", "drupal-module"),
            InventoryEntry::new("drupal/views", "drupal-module"),
            InventoryEntry::new("drupal/pathauto", "drupal-module"),
        ])
        .scan(tmp.path())
        .unwrap();

        assert!(!result.all_in_use());
        assert_eq!(
            result.unused,
            vec![
                PackageName::new("drupal", "token"),
                PackageName::new("drupal", "pathauto")
            ]
        );
    }

    #[test]
    fn config_failure_stops_before_inventory() {
        struct PanickingInventory;
        impl PackageInventory for PanickingInventory {
            fn list_all(&self) -> Result<Vec<InventoryEntry>> {
                panic!("inventory must not be read when configuration is missing");
            }
        }

        let tmp = TempDir::new().unwrap();
        let scanner = Scanner::new(
            ConfigReader::new(),
            InstalledPackageLister::new(PanickingInventory),
        );
        let err = scanner.scan(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, DrupalUnusedError::ConfigNotFound { .. }));
    }
}
