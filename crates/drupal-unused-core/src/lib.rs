pub mod composer;
pub mod config;
pub mod document;
pub mod error;
pub mod extensions;
pub mod inventory;
pub mod manifest;
pub mod package;
pub mod removal;
pub mod resolver;
pub mod scan;

pub use composer::{ComposerCli, PackageManager};
pub use config::{ComposerConfig, Config, ScanConfig, DEFAULT_CONFIG_DIR};
pub use document::{ConfigDocument, StructuredFileReader, YamlFileReader};
pub use error::{DrupalUnusedError, Result};
pub use extensions::{ConfigReader, EnabledExtensionSet, CORE_EXTENSION_FILE};
pub use inventory::{
    InstalledJsonInventory, InstalledPackageLister, InstalledPackages, PackageInventory,
};
pub use manifest::{ProjectManifest, Requirements};
pub use package::{ExtensionName, InventoryEntry, PackageName, DRUPAL_MODULE_TYPE};
pub use removal::{RemovalCoordinator, RemovalOutcome, RemovalPhase, RemovalReport, RemovalStatus};
pub use resolver::resolve_unused;
pub use scan::{ScanResult, Scanner};
