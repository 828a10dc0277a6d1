//! Text rendering for scan and removal results

use std::fmt::Write;

use colored::Colorize;
use drupal_unused_core::{RemovalReport, RemovalStatus, ScanResult};

pub fn render_scan(result: &ScanResult) -> String {
    let mut out = String::new();

    if result.all_in_use() {
        let _ = writeln!(out, "{}", "All installed Drupal packages are in use.".green());
    } else {
        let _ = writeln!(out, "{}", "Unused Drupal packages found:".yellow());
        for package in &result.unused {
            let _ = writeln!(out, "- {}", package.extension);
        }
    }

    if !result.installed.malformed.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} skipped package names without a vendor prefix:",
            "[WARN]".yellow().bold()
        );
        for name in &result.installed.malformed {
            let _ = writeln!(out, "  {}", name);
        }
    }

    out
}

pub fn render_removal(report: &RemovalReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        let line = match &outcome.status {
            RemovalStatus::Removed => format!("  {} {}", "[DEL]".red(), outcome.package),
            RemovalStatus::WouldRemove => {
                format!("  {} {}", "[DRY]".yellow(), outcome.package)
            }
            RemovalStatus::NotDirectlyRequired => format!(
                "  {} {} (not listed in composer.json require/require-dev)",
                "[SKIP]".blue(),
                outcome.package
            ),
            RemovalStatus::Failed { reason } => {
                format!("  {} {}: {}", "[FAIL]".red().bold(), outcome.package, reason)
            }
        };
        let _ = writeln!(out, "{}", line);
    }

    let would_remove = report
        .outcomes
        .iter()
        .filter(|o| o.status == RemovalStatus::WouldRemove)
        .count();

    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    if would_remove > 0 {
        let _ = writeln!(out, "  Would remove: {}", would_remove);
    } else {
        let _ = writeln!(out, "  Removed: {}", report.succeeded_count());
    }
    let _ = writeln!(out, "  Failed: {}", report.failed_count());
    let _ = writeln!(
        out,
        "  Skipped: {} (not direct requirements)",
        report.not_directly_required().len()
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use drupal_unused_core::{
        EnabledExtensionSet, InstalledPackages, PackageName, RemovalOutcome,
    };
    use std::path::PathBuf;

    fn scan(unused: &[&str]) -> ScanResult {
        ScanResult {
            config_dir: PathBuf::from("config/sync"),
            enabled: ["views", "devel", "debug_toolbar"]
                .into_iter()
                .collect::<EnabledExtensionSet>(),
            installed: InstalledPackages::default(),
            unused: unused.iter().map(|n| PackageName::new("drupal", *n)).collect(),
        }
    }

    #[test]
    fn lists_unused_packages() {
        let text = render_scan(&scan(&["token"]));
        assert!(text.contains("Unused Drupal packages found:"));
        assert!(text.contains("- token"));
        assert!(!text.contains("- views"));
    }

    #[test]
    fn reports_all_in_use() {
        let text = render_scan(&scan(&[]));
        assert!(text.contains("All installed Drupal packages are in use."));
        assert!(!text.contains("Unused Drupal packages found:"));
    }

    #[test]
    fn shows_malformed_names() {
        let mut result = scan(&[]);
        result.installed.malformed.push("orphan".to_string());
        assert!(render_scan(&result).contains("orphan"));
    }

    #[test]
    fn removal_lines_and_summary() {
        let report = RemovalReport {
            outcomes: vec![
                RemovalOutcome::new(PackageName::new("drupal", "token"), RemovalStatus::Removed),
                RemovalOutcome::new(
                    PackageName::new("drupal", "ctools"),
                    RemovalStatus::NotDirectlyRequired,
                ),
                RemovalOutcome::new(
                    PackageName::new("drupal", "old_mod"),
                    RemovalStatus::Failed {
                        reason: "exit 2".to_string(),
                    },
                ),
            ],
            update_invoked: true,
        };

        let text = render_removal(&report);
        assert!(text.contains("drupal/token"));
        assert!(text.contains("drupal/old_mod: exit 2"));
        assert!(text.contains("Removed: 1"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("Skipped: 1"));
    }
}
