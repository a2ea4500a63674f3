// keyset CLI - consolidate license keys from key export files

mod exit_codes;
mod merge;
mod scan;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_CONFIG, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};

#[derive(Parser)]
#[command(name = "keyset")]
#[command(about = "Consolidate product license keys from key export files into disjoint key sets")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the tabular key list and every markup key file in a folder
    #[command(after_help = "\
Examples:
  keyset merge
  keyset merge ~/keys
  keyset merge ~/keys --json > summary.json
  keyset merge ~/keys --dry-run --single-pass")]
    Merge {
        /// Folder holding the key files (defaults to the current directory)
        folder: Option<PathBuf>,

        /// Settings file (defaults to FOLDER/keyset.toml, then the user config)
        #[arg(long, env = "KEYSET_CONFIG")]
        config: Option<PathBuf>,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Consolidate and report without writing any file
        #[arg(long)]
        dry_run: bool,

        /// Reconcile with one pass only instead of running to a fixed point
        #[arg(long)]
        single_pass: bool,
    },

    /// Parse every markup key file and report per-file counts
    #[command(after_help = "\
Examples:
  keyset scan ~/keys
  keyset scan ~/keys --json")]
    Scan {
        /// Folder holding the key files (defaults to the current directory)
        folder: Option<PathBuf>,

        /// Settings file (defaults to FOLDER/keyset.toml, then the user config)
        #[arg(long, env = "KEYSET_CONFIG")]
        config: Option<PathBuf>,

        /// Print the per-file report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: keyset <command> [options]");
            eprintln!("       keyset --help for more information");
            Ok(())
        }
        Some(Commands::Merge {
            folder,
            config,
            json,
            dry_run,
            single_pass,
        }) => merge::cmd_merge(merge::MergeOptions {
            folder,
            config,
            json,
            dry_run,
            single_pass,
        }),
        Some(Commands::Scan { folder, config, json }) => scan::cmd_scan(folder, config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Resolve the folder argument; a given folder must exist.
fn resolve_folder(folder: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let folder = match folder {
        Some(f) => f,
        None => std::env::current_dir()
            .map_err(|e| CliError::io(format!("cannot read current directory: {e}")))?,
    };
    if !folder.is_dir() {
        return Err(CliError::args(format!("{} is not a directory", folder.display()))
            .with_hint("provide a folder path with key files"));
    }
    Ok(folder)
}

fn load_settings(
    config: Option<&Path>,
    folder: &Path,
) -> Result<(keyset_config::Settings, keyset_config::SettingsSource), CliError> {
    let (settings, source) = keyset_config::Settings::resolve(config, folder)
        .map_err(|e| CliError::config(e.to_string()))?;
    tracing::info!(source = %source, "loaded settings");
    Ok((settings, source))
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, msg)
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::new(EXIT_WRITE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
