use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrupalUnusedError {
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Malformed package name: '{name}' - expected <vendor>/<name>")]
    MalformedPackageName { name: String },

    #[error("Project manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Installed package inventory not found: {path} (run `composer install` first)")]
    InventoryNotFound { path: PathBuf },

    #[error("Composer executable not found: {binary}")]
    ComposerNotFound { binary: String },

    #[error("Composer execution failed: {message}")]
    ComposerExecutionFailed { message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DrupalUnusedError>;

impl DrupalUnusedError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigParse { .. } => 1,
            Self::ManifestNotFound { .. } | Self::InventoryNotFound { .. } => 2,
            Self::ComposerNotFound { .. } => 3,
            Self::ConfigKeyNotFound { .. } => 4,
            _ => 1,
        }
    }
}
