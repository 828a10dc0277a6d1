//! Removal of unused packages
//!
//! A removal run moves through [`RemovalPhase`]s:
//!
//! ```text
//! Idle -> Validating -> Mutating -> Invoking -> Reported
//! ```
//!
//! Targets that are not top-level requirements are reported as
//! [`RemovalStatus::NotDirectlyRequired`] and left out of the update. The
//! remaining targets are stripped from `require` and `require-dev`, then a
//! single `composer update` restricted to exactly those names is run. A
//! failure at any point after validation marks every attempted target as
//! failed. Nothing here returns an error: the caller always gets a report.
//!
//! The manifest is only touched once the package manager reports itself
//! available. If writing `require-dev` fails after `require` was written,
//! `require` is put back.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::composer::PackageManager;
use crate::error::Result;
use crate::manifest::Requirements;
use crate::package::PackageName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPhase {
    Idle,
    Validating,
    Mutating,
    Invoking,
    Reported,
}

impl fmt::Display for RemovalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Mutating => "mutating",
            Self::Invoking => "invoking",
            Self::Reported => "reported",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemovalStatus {
    /// Dropped from the manifest and the update succeeded
    Removed,
    /// Dry run: would have been removed
    WouldRemove,
    /// Not a top-level requirement (transitive, or already removed)
    NotDirectlyRequired,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub package: PackageName,
    #[serde(flatten)]
    pub status: RemovalStatus,
}

impl RemovalOutcome {
    pub fn new(package: PackageName, status: RemovalStatus) -> Self {
        Self { package, status }
    }

    /// Whether the package manager was asked to remove this package
    pub fn attempted(&self) -> bool {
        matches!(
            self.status,
            RemovalStatus::Removed | RemovalStatus::Failed { .. }
        )
    }

    pub fn succeeded(&self) -> bool {
        self.status == RemovalStatus::Removed
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            RemovalStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Per-package outcomes of one removal run, in target order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub outcomes: Vec<RemovalOutcome>,
    /// Whether the package manager update step ran
    pub update_invoked: bool,
}

impl RemovalReport {
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().len()
    }

    /// Failed packages with their reasons
    pub fn failures(&self) -> Vec<(&PackageName, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.failure_reason().map(|reason| (&o.package, reason)))
            .collect()
    }

    pub fn not_directly_required(&self) -> Vec<&PackageName> {
        self.outcomes
            .iter()
            .filter(|o| o.status == RemovalStatus::NotDirectlyRequired)
            .map(|o| &o.package)
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.failure_reason().is_some())
    }

    pub fn get(&self, package: &PackageName) -> Option<&RemovalOutcome> {
        self.outcomes.iter().find(|o| &o.package == package)
    }
}

/// Drives removal of unused packages through a [`PackageManager`]
#[derive(Debug, Clone)]
pub struct RemovalCoordinator<M> {
    manager: M,
    dev_mode: bool,
    dry_run: bool,
}

impl<M: PackageManager> RemovalCoordinator<M> {
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            dev_mode: true,
            dry_run: false,
        }
    }

    /// Pass `--no-dev` semantics to the update step when false
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Validate only; never touch the manifest or run the update
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Remove a single package
    pub fn remove_one(&self, target: &PackageName) -> RemovalOutcome {
        self.remove_all(std::slice::from_ref(target))
            .outcomes
            .into_iter()
            .next()
            .unwrap_or_else(|| {
                RemovalOutcome::new(
                    target.clone(),
                    RemovalStatus::Failed {
                        reason: "no outcome recorded".to_string(),
                    },
                )
            })
    }

    /// Remove every target in one restricted update
    pub fn remove_all(&self, targets: &[PackageName]) -> RemovalReport {
        let mut phase = RemovalPhase::Idle;
        let mut report = RemovalReport::default();

        let mut seen = HashSet::new();
        let targets: Vec<&PackageName> = targets.iter().filter(|t| seen.insert(*t)).collect();
        if targets.is_empty() {
            return report;
        }

        transition(&mut phase, RemovalPhase::Validating);
        let (require, require_dev) = match self.load_requirements() {
            Ok(reqs) => reqs,
            Err(reason) => {
                transition(&mut phase, RemovalPhase::Reported);
                report.outcomes = fail_all(&targets, &reason);
                return report;
            }
        };

        let mut statuses: Vec<Option<RemovalStatus>> = Vec::with_capacity(targets.len());
        let mut attempted: Vec<String> = Vec::new();
        for target in &targets {
            let name = target.to_string();
            if require.contains(&name) || require_dev.contains(&name) {
                statuses.push(None);
                attempted.push(name);
            } else {
                tracing::info!("{} is not a direct requirement, skipping", name);
                statuses.push(Some(RemovalStatus::NotDirectlyRequired));
            }
        }

        let pending_status = if attempted.is_empty() {
            None
        } else if self.dry_run {
            Some(RemovalStatus::WouldRemove)
        } else {
            Some(self.mutate_and_update(&mut phase, &attempted, require, require_dev))
        };
        report.update_invoked = phase == RemovalPhase::Invoking;
        transition(&mut phase, RemovalPhase::Reported);

        report.outcomes = targets
            .into_iter()
            .zip(statuses)
            .map(|(target, status)| {
                let status = status
                    .or_else(|| pending_status.clone())
                    .unwrap_or(RemovalStatus::NotDirectlyRequired);
                RemovalOutcome::new(target.clone(), status)
            })
            .collect();

        tracing::info!(
            removed = report.succeeded_count(),
            failed = report.failed_count(),
            "removal finished"
        );
        report
    }

    fn load_requirements(&self) -> std::result::Result<(Requirements, Requirements), String> {
        let require = self
            .manager
            .declared_requirements(false)
            .map_err(|e| e.to_string())?;
        let require_dev = self
            .manager
            .declared_requirements(true)
            .map_err(|e| e.to_string())?;
        Ok((require, require_dev))
    }

    /// Status shared by every attempted package
    fn mutate_and_update(
        &self,
        phase: &mut RemovalPhase,
        attempted: &[String],
        require: Requirements,
        require_dev: Requirements,
    ) -> RemovalStatus {
        if let Err(e) = self.manager.ensure_available() {
            return RemovalStatus::Failed {
                reason: e.to_string(),
            };
        }

        transition(phase, RemovalPhase::Mutating);
        if let Err(e) = self.write_requirements(attempted, require, require_dev) {
            return RemovalStatus::Failed {
                reason: format!("failed to update requirements: {}", e),
            };
        }

        transition(phase, RemovalPhase::Invoking);
        match self.manager.run_update(attempted, self.dev_mode) {
            Ok(0) => RemovalStatus::Removed,
            Ok(code) => RemovalStatus::Failed {
                reason: format!("package manager update exited with status {}", code),
            },
            Err(e) => RemovalStatus::Failed {
                reason: e.to_string(),
            },
        }
    }

    /// Strip `attempted` from both lists, writing only the lists that changed
    fn write_requirements(
        &self,
        attempted: &[String],
        original_require: Requirements,
        original_require_dev: Requirements,
    ) -> Result<()> {
        let mut require = original_require.clone();
        let mut require_dev = original_require_dev;
        let mut require_changed = false;
        let mut require_dev_changed = false;
        for name in attempted {
            require_changed |= require.remove(name);
            require_dev_changed |= require_dev.remove(name);
        }

        if require_changed {
            self.manager.set_declared_requirements(false, &require)?;
        }
        if !require_dev_changed {
            return Ok(());
        }

        if let Err(e) = self.manager.set_declared_requirements(true, &require_dev) {
            if require_changed {
                if let Err(restore) = self
                    .manager
                    .set_declared_requirements(false, &original_require)
                {
                    tracing::error!("could not restore require: {}", restore);
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

fn transition(phase: &mut RemovalPhase, next: RemovalPhase) {
    tracing::debug!("removal: {} -> {}", phase, next);
    *phase = next;
}

fn fail_all(targets: &[&PackageName], reason: &str) -> Vec<RemovalOutcome> {
    targets
        .iter()
        .map(|t| {
            RemovalOutcome::new(
                (*t).clone(),
                RemovalStatus::Failed {
                    reason: reason.to_string(),
                },
            )
        })
        .collect()
}
