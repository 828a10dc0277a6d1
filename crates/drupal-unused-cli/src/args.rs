use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "drupal-unused")]
#[command(about = "Find Drupal Composer packages that no configuration enables")]
#[command(version)]
pub struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project root containing composer.json (default: current directory)
    #[arg(short = 'd', long, global = true)]
    pub working_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List installed Drupal packages that are not enabled in configuration
    Scan {
        /// Config sync directory (default: config/sync, or scan.config_dir)
        #[arg(long)]
        config_dir: Option<PathBuf>,

        /// Remove unused packages from composer.json and run composer update
        #[arg(long)]
        remove: bool,

        /// With --remove: report what would be removed without changing anything
        #[arg(long, requires = "remove")]
        dry_run: bool,

        /// With --remove: run composer update with --no-dev
        #[arg(long, requires = "remove")]
        no_dev: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., scan.config_dir)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., scan.package_types)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Create config file with defaults and comments
    Init,
}
