//! Composer integration
//!
//! [`PackageManager`] is the narrow contract the removal coordinator needs
//! from the host package manager. [`ComposerCli`] implements it by editing
//! `composer.json` directly and shelling out to `composer update`.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{DrupalUnusedError, Result};
use crate::manifest::{ProjectManifest, Requirements};

pub const DEFAULT_COMPOSER_BINARY: &str = "composer";

/// Host package manager operations used during removal
pub trait PackageManager {
    /// Top-level requirements (`require-dev` when `dev`)
    fn declared_requirements(&self, dev: bool) -> Result<Requirements>;

    /// Persist new top-level requirements
    fn set_declared_requirements(&self, dev: bool, requirements: &Requirements) -> Result<()>;

    /// Update only the packages in `allow_list`. Returns the exit status.
    fn run_update(&self, allow_list: &[String], dev_mode: bool) -> Result<i32>;

    /// Fails if the update step cannot run at all
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }
}

/// Composer executable working on a project directory
#[derive(Debug, Clone)]
pub struct ComposerCli {
    project_dir: PathBuf,
    binary: String,
}

impl ComposerCli {
    pub fn new(project_dir: PathBuf) -> Self {
        Self {
            project_dir,
            binary: DEFAULT_COMPOSER_BINARY.to_string(),
        }
    }

    /// Use a different composer executable
    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Arguments for `composer update` restricted to `allow_list`
    pub fn update_args(allow_list: &[String], dev_mode: bool) -> Vec<String> {
        let mut args = vec![
            "update".to_string(),
            "--no-interaction".to_string(),
        ];
        if !dev_mode {
            args.push("--no-dev".to_string());
        }
        args.extend(allow_list.iter().cloned());
        args
    }
}

impl PackageManager for ComposerCli {
    // Re-read on every call: composer itself rewrites this file.
    fn declared_requirements(&self, dev: bool) -> Result<Requirements> {
        Ok(ProjectManifest::load(&self.project_dir)?.requirements(dev))
    }

    fn set_declared_requirements(&self, dev: bool, requirements: &Requirements) -> Result<()> {
        let mut manifest = ProjectManifest::load(&self.project_dir)?;
        manifest.set_requirements(dev, requirements);
        manifest.save()
    }

    fn run_update(&self, allow_list: &[String], dev_mode: bool) -> Result<i32> {
        let args = Self::update_args(allow_list, dev_mode);
        tracing::info!("running {} {}", self.binary, args.join(" "));

        let status = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| DrupalUnusedError::ComposerExecutionFailed {
                message: format!("Failed to spawn {}: {}", self.binary, e),
            })?;

        // Killed by a signal: no code, report as generic failure.
        Ok(status.code().unwrap_or(1))
    }

    fn ensure_available(&self) -> Result<()> {
        require_composer_cli(&self.binary)
    }
}

/// Whether `binary --version` runs successfully
fn check_composer_cli(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Error unless the composer executable is available
fn require_composer_cli(binary: &str) -> Result<()> {
    if !check_composer_cli(binary) {
        return Err(DrupalUnusedError::ComposerNotFound {
            binary: binary.to_string(),
        });
    }
    Ok(())
}
