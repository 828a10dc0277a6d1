//! End-to-end reconciliation over a Drupal project laid out on disk.
//!
//! The composer executable is replaced by [`ScriptedComposer`], which keeps
//! the real `composer.json` handling but returns a scripted update result.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use drupal_unused_core::{
    ComposerCli, ConfigReader, DrupalUnusedError, InstalledJsonInventory, InstalledPackageLister,
    PackageManager, PackageName, ProjectManifest, RemovalCoordinator, RemovalStatus, Requirements,
    Result, Scanner,
};
use tempfile::TempDir;

struct ScriptedComposer {
    inner: ComposerCli,
    update_result: std::result::Result<i32, String>,
    updates: RefCell<Vec<Vec<String>>>,
}

impl ScriptedComposer {
    fn new(project: &Path, update_result: std::result::Result<i32, String>) -> Self {
        Self {
            inner: ComposerCli::new(project.to_path_buf()),
            update_result,
            updates: RefCell::new(Vec::new()),
        }
    }
}

impl PackageManager for ScriptedComposer {
    fn declared_requirements(&self, dev: bool) -> Result<Requirements> {
        self.inner.declared_requirements(dev)
    }

    fn set_declared_requirements(&self, dev: bool, requirements: &Requirements) -> Result<()> {
        self.inner.set_declared_requirements(dev, requirements)
    }

    fn run_update(&self, allow_list: &[String], _dev_mode: bool) -> Result<i32> {
        self.updates.borrow_mut().push(allow_list.to_vec());
        self.update_result
            .clone()
            .map_err(|message| DrupalUnusedError::ComposerExecutionFailed { message })
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Project with enabled = {views, devel} + split {debug_toolbar}
fn project(installed: &[&str], require: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write(
        &root.join("config/sync/core.extension.yml"),
        "module:\n  views: 0\n  devel: 0\ntheme:\n  olivero: 0\nprofile: standard\n",
    );
    write(
        &root.join("config/sync/config_split.config_split.dev.yml"),
        "id: dev\nstatus: true\nmodule:\n  debug_toolbar: 0\n",
    );

    let packages: Vec<String> = installed
        .iter()
        .map(|name| format!(r#"{{"name": "drupal/{}", "type": "drupal-module"}}"#, name))
        .chain(std::iter::once(
            r#"{"name": "drupal/core", "type": "drupal-core"}"#.to_string(),
        ))
        .collect();
    write(
        &root.join("vendor/composer/installed.json"),
        &format!(r#"{{"packages": [{}], "dev": true}}"#, packages.join(",")),
    );

    let require: Vec<String> = std::iter::once(r#""drupal/core": "^10.2""#.to_string())
        .chain(
            require
                .iter()
                .map(|name| format!(r#""drupal/{}": "^1.0""#, name)),
        )
        .collect();
    write(
        &root.join("composer.json"),
        &format!(
            r#"{{"name": "acme/site", "require": {{{}}}, "require-dev": {{}}}}"#,
            require.join(",")
        ),
    );

    tmp
}

fn scan_unused(root: &Path) -> Result<Vec<PackageName>> {
    let manifest = ProjectManifest::load(root)?;
    let scanner = Scanner::new(
        ConfigReader::new(),
        InstalledPackageLister::new(InstalledJsonInventory::from_vendor_dir(
            &manifest.vendor_dir(),
        )),
    );
    Ok(scanner.scan(&root.join("config/sync"))?.unused)
}

fn drupal(name: &str) -> PackageName {
    PackageName::new("drupal", name)
}

#[test]
fn unused_module_is_found() {
    let tmp = project(&["views", "devel", "debug_toolbar", "token"], &[]);
    assert_eq!(scan_unused(tmp.path()).unwrap(), vec![drupal("token")]);
}

#[test]
fn everything_in_use() {
    let tmp = project(&["views", "devel", "debug_toolbar"], &[]);
    assert!(scan_unused(tmp.path()).unwrap().is_empty());
}

#[test]
fn repeated_scans_agree() {
    let tmp = project(&["token", "views", "pathauto", "devel"], &[]);
    let first = scan_unused(tmp.path()).unwrap();
    let second = scan_unused(tmp.path()).unwrap();
    assert_eq!(first, vec![drupal("token"), drupal("pathauto")]);
    assert_eq!(first, second);
}

#[test]
fn split_order_does_not_matter() {
    let local = "module:\n  stage_file_proxy: 0\n  debug_toolbar: 0\n";
    let prod = "module:\n  devel: 0\n";
    let installed = ["views", "devel", "debug_toolbar", "token", "stage_file_proxy"];

    // Split files are read in name order; swapping names swaps the order.
    let mut results = Vec::new();
    for (first, second) in [(local, prod), (prod, local)] {
        let tmp = project(&installed, &[]);
        write(
            &tmp.path().join("config/sync/config_split.config_split.a.yml"),
            first,
        );
        write(
            &tmp.path().join("config/sync/config_split.config_split.b.yml"),
            second,
        );
        let enabled = ConfigReader::new()
            .get_all_enabled_extensions(&tmp.path().join("config/sync"))
            .unwrap();
        results.push((enabled, scan_unused(tmp.path()).unwrap()));
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[0].1, vec![drupal("token")]);
}

#[test]
fn missing_config_directory_is_fatal() {
    let tmp = project(&["views"], &[]);
    fs::remove_dir_all(tmp.path().join("config/sync")).unwrap();

    let err = scan_unused(tmp.path()).unwrap_err();
    assert!(matches!(err, DrupalUnusedError::ConfigNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn direct_requirement_is_removed() {
    let tmp = project(&["views", "devel", "debug_toolbar", "token"], &["token", "views"]);
    let unused = scan_unused(tmp.path()).unwrap();

    let coordinator = RemovalCoordinator::new(ScriptedComposer::new(tmp.path(), Ok(0)));
    let report = coordinator.remove_all(&unused);

    assert_eq!(report.succeeded_count(), 1);
    assert!(report.get(&drupal("token")).unwrap().succeeded());
    assert_eq!(
        coordinator.manager().updates.borrow().as_slice(),
        &[vec!["drupal/token".to_string()]]
    );

    let manifest = ProjectManifest::load(tmp.path()).unwrap();
    assert!(!manifest.requirements(false).contains("drupal/token"));
    assert!(manifest.requirements(false).contains("drupal/views"));
}

#[test]
fn transitive_dependency_is_left_alone() {
    let tmp = project(&["views", "devel", "debug_toolbar", "token"], &["views"]);
    let before = fs::read_to_string(tmp.path().join("composer.json")).unwrap();
    let unused = scan_unused(tmp.path()).unwrap();

    let coordinator = RemovalCoordinator::new(ScriptedComposer::new(tmp.path(), Ok(0)));
    let report = coordinator.remove_all(&unused);

    assert_eq!(
        report.get(&drupal("token")).unwrap().status,
        RemovalStatus::NotDirectlyRequired
    );
    assert!(!report.update_invoked);
    assert!(coordinator.manager().updates.borrow().is_empty());

    let after = fs::read_to_string(tmp.path().join("composer.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn failed_update_fails_the_whole_batch() {
    let tmp = project(
        &["views", "devel", "debug_toolbar", "token", "old_mod"],
        &["token", "old_mod"],
    );
    let unused = scan_unused(tmp.path()).unwrap();
    assert_eq!(unused, vec![drupal("token"), drupal("old_mod")]);

    let coordinator = RemovalCoordinator::new(ScriptedComposer::new(
        tmp.path(),
        Err("Your requirements could not be resolved".to_string()),
    ));
    let report = coordinator.remove_all(&unused);

    assert_eq!(report.failed_count(), 2);
    let failures = report.failures();
    assert_eq!(failures[0].1, failures[1].1);
    assert!(failures[0].1.contains("could not be resolved"));

    // Declarations were rewritten before the update ran.
    let manifest = ProjectManifest::load(tmp.path()).unwrap();
    assert!(!manifest.requirements(false).contains("drupal/token"));
}

#[test]
fn mixed_batch_keeps_skipped_separate() {
    let tmp = project(
        &["views", "devel", "debug_toolbar", "token", "old_mod"],
        &["old_mod"],
    );
    let unused = scan_unused(tmp.path()).unwrap();

    let coordinator = RemovalCoordinator::new(ScriptedComposer::new(tmp.path(), Ok(1)));
    let report = coordinator.remove_all(&unused);

    assert_eq!(report.not_directly_required(), vec![&drupal("token")]);
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].0, &drupal("old_mod"));
}

#[test]
fn rerun_after_removal_converges() {
    let tmp = project(&["views", "devel", "debug_toolbar", "token"], &["token"]);
    let unused = scan_unused(tmp.path()).unwrap();
    let coordinator = RemovalCoordinator::new(ScriptedComposer::new(tmp.path(), Ok(0)));

    assert!(coordinator.remove_one(&unused[0]).succeeded());
    let again = coordinator.remove_one(&unused[0]);

    assert_eq!(again.status, RemovalStatus::NotDirectlyRequired);
    assert_eq!(coordinator.manager().updates.borrow().len(), 1);
}
