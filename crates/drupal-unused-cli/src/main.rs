use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drupal_unused_core::{
    ComposerCli, Config, ConfigReader, DrupalUnusedError, InstalledJsonInventory,
    InstalledPackageLister, ProjectManifest, RemovalCoordinator, Result, Scanner,
};

mod args;
mod output;
use args::{Cli, Commands, ConfigAction, Shell};

const PROJECT_DIR_ENV: &str = "DRUPAL_UNUSED_PROJECT_DIR";

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let project_dir = resolve_project_dir(cli.working_dir);

    let result = match cli.command {
        Some(Commands::Scan {
            config_dir,
            remove,
            dry_run,
            no_dev,
            json,
        }) => handle_scan(
            &project_dir,
            config_dir.as_deref(),
            remove,
            dry_run,
            no_dev,
            json,
        ),
        Some(Commands::Config { action }) => handle_config(action, &project_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Log to stderr; stdout carries the report
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "drupal-unused", &mut io::stdout());
}

fn resolve_project_dir(cli_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = cli_dir {
        return dir;
    }

    if let Ok(dir) = std::env::var(PROJECT_DIR_ENV) {
        return PathBuf::from(dir);
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn handle_scan(
    project_dir: &Path,
    config_dir: Option<&Path>,
    remove: bool,
    dry_run: bool,
    no_dev: bool,
    json: bool,
) -> Result<()> {
    let config = Config::load(project_dir)?;
    let config_dir = project_dir.join(config_dir.unwrap_or(config.scan.config_dir.as_path()));

    if !json {
        println!(
            "{} {}",
            "Using configuration directory:".cyan(),
            config_dir.display()
        );
    }

    // Without a readable composer.json, fall back to Composer's default vendor dir.
    let vendor_dir = match ProjectManifest::load(project_dir) {
        Ok(manifest) => manifest.vendor_dir(),
        Err(e) => {
            tracing::debug!("using default vendor dir: {}", e);
            project_dir.join("vendor")
        }
    };

    let scanner = Scanner::new(
        ConfigReader::new().split_pattern(config.scan.split_pattern.clone()),
        InstalledPackageLister::new(InstalledJsonInventory::from_vendor_dir(&vendor_dir))
            .package_types(config.scan.package_types.clone()),
    );
    let result = scanner.scan(&config_dir)?;

    if !json {
        println!();
        print!("{}", output::render_scan(&result));
    }

    if !remove || result.all_in_use() {
        if json {
            print_json(&serde_json::json!({ "scan": result }))?;
        }
        return Ok(());
    }

    if !json {
        println!();
        println!("Attempting to remove unused packages...");
        if dry_run {
            println!("{}", "(dry run)".yellow());
        }
    }

    let composer =
        ComposerCli::new(project_dir.to_path_buf()).binary(config.composer.binary.clone());
    let coordinator = RemovalCoordinator::new(composer)
        .dev_mode(config.composer.dev_mode && !no_dev)
        .dry_run(dry_run);
    let report = coordinator.remove_all(&result.unused);

    if json {
        print_json(&serde_json::json!({ "scan": result, "removal": report }))?;
    } else {
        println!();
        print!("{}", output::render_removal(&report));
        if report.has_failures() {
            println!();
            println!(
                "{}",
                "Some packages could not be removed; see the reasons above.".yellow()
            );
        } else if !dry_run {
            println!();
            println!("{}", "Removal complete.".green());
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{}", text);
    Ok(())
}

fn handle_config(action: ConfigAction, project_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(project_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(DrupalUnusedError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(project_dir)?;
            config.set(&key, &value)?;
            config.save(project_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(project_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(project_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(project_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
