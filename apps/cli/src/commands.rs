//! CLI command definitions, routing, and tracing setup.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bookmarkup_core::pipeline::{
    FolderSummary, ProgressReporter, ReorganizeConfig, Reorganized, reorganize,
};
use bookmarkup_shared::{
    AppConfig, BackupFormat, BookmarkUpError, SourceDocument, init_config, load_config,
    load_config_from,
};
use bookmarkup_storage::{BookmarkStore, create_snapshots};
use clap::{Parser, Subcommand};
use color_eyre::Section;
use color_eyre::eyre::{Report, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::browser;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// BookmarkUp: regroup browser bookmarks into keyword folders.
#[derive(Parser)]
#[command(
    name = "bookmarkup",
    version,
    about = "Regroup browser bookmarks into folders named after the keywords in their titles.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.bookmarkup/bookmarkup.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bookmarks file to operate on (overrides the config file).
    #[arg(long, global = true, env = "BOOKMARKUP_BOOKMARKS")]
    pub bookmarks: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Recovery snapshot format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum BackupArg {
    Raw,
    Html,
    Both,
}

impl From<BackupArg> for BackupFormat {
    fn from(arg: BackupArg) -> Self {
        match arg {
            BackupArg::Raw => BackupFormat::Raw,
            BackupArg::Html => BackupFormat::Html,
            BackupArg::Both => BackupFormat::Both,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Regroup the bookmarks, back up the original, and write the new tree.
    Organize {
        /// Skip the confirmation prompt (aborts if the browser is running).
        #[arg(short, long)]
        yes: bool,

        /// Backup format (defaults to the config file's).
        #[arg(long)]
        backup: Option<BackupArg>,

        /// Directory for backups (defaults to the config file's).
        #[arg(long)]
        backup_dir: Option<PathBuf>,

        /// Write an empty tree instead of failing when no bookmarks are found.
        #[arg(long)]
        allow_empty: bool,
    },

    /// Show the folders that `organize` would create, without writing anything.
    Preview {
        /// Print the full rebuilt tree as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a backup of the bookmarks file and exit.
    Backup {
        /// Backup format (defaults to the config file's).
        #[arg(long)]
        format: Option<BackupArg>,

        /// Directory for backups (defaults to the config file's).
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so that `preview --json` output stays clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bookmarkup=info",
        1 => "bookmarkup=debug",
        _ => "bookmarkup=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    // A broken config file must not prevent writing a fresh one.
    if matches!(cli.command, Command::Config { action: ConfigAction::Init }) {
        return cmd_config_init();
    }

    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Organize {
            yes,
            backup,
            backup_dir,
            allow_empty,
        } => cmd_organize(&config, yes, backup, backup_dir, allow_empty),
        Command::Preview { json } => cmd_preview(&config, json),
        Command::Backup { format, backup_dir } => cmd_backup(&config, format, backup_dir),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Load the config file and apply global flag overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(path) = &cli.bookmarks {
        config.store.bookmarks_path = path.to_string_lossy().into_owned();
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_organize(
    config: &AppConfig,
    yes: bool,
    backup: Option<BackupArg>,
    backup_dir: Option<PathBuf>,
    allow_empty: bool,
) -> Result<()> {
    browser::ensure_closed(&config.store.browser_process, yes)?;

    let store = BookmarkStore::new(config.store.bookmarks_path());
    println!("Targeting bookmarks file at: {}", store.path().display());

    let document = load_store(&store)?;
    let reorganize_config = ReorganizeConfig {
        allow_empty,
        ..ReorganizeConfig::from(config)
    };

    let reporter = CliProgress::new();
    let result = reorganize(&document, &reorganize_config, &reporter)
        .map_err(|e| explain(e, store.path()))?;

    println!();
    println!(
        "  Found {} bookmarks, grouped into {} folders:",
        result.bookmark_count,
        result.folders.len()
    );
    print_folders(&result.folders);
    println!();

    if !yes && !browser::confirm(&format!("Rewrite {}?", store.path().display()))? {
        println!("Aborted, nothing was written.");
        return Ok(());
    }

    let format = backup.map(BackupFormat::from).unwrap_or(config.backup.format);
    let dir = backup_dir.unwrap_or_else(|| config.backup.dir());
    let receipts =
        create_snapshots(&store, format, &dir).map_err(|e| explain(e, store.path()))?;
    for receipt in &receipts {
        println!("  Backup created at: {}", receipt.path.display());
    }

    store.save(&result.tree).map_err(|e| explain(e, store.path()))?;

    info!(
        path = %store.path().display(),
        bookmarks = result.bookmark_count,
        folders = result.folders.len(),
        "bookmarks reorganized"
    );
    println!();
    println!("  Saved to {}.", store.path().display());
    println!("  Relaunch the browser to see the new folders.");
    println!();

    Ok(())
}

fn cmd_preview(config: &AppConfig, json: bool) -> Result<()> {
    let store = BookmarkStore::new(config.store.bookmarks_path());
    let document = load_store(&store)?;

    let reorganize_config = ReorganizeConfig {
        allow_empty: true,
        ..ReorganizeConfig::from(config)
    };
    let result = reorganize(&document, &reorganize_config, &QuietProgress)
        .map_err(|e| explain(e, store.path()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.tree)?);
        return Ok(());
    }

    println!(
        "{} bookmarks would be grouped into {} folders:",
        result.bookmark_count,
        result.folders.len()
    );
    print_folders(&result.folders);
    Ok(())
}

fn cmd_backup(
    config: &AppConfig,
    format: Option<BackupArg>,
    backup_dir: Option<PathBuf>,
) -> Result<()> {
    let store = BookmarkStore::new(config.store.bookmarks_path());
    let format = format.map(BackupFormat::from).unwrap_or(config.backup.format);
    let dir = backup_dir.unwrap_or_else(|| config.backup.dir());

    let receipts =
        create_snapshots(&store, format, &dir).map_err(|e| explain(e, store.path()))?;
    for receipt in receipts {
        println!("{}  {}", receipt.sha256, receipt.path.display());
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_store(store: &BookmarkStore) -> Result<SourceDocument> {
    store.load().map_err(|e| explain(e, store.path()))
}

/// Attach a hint for the failures users can act on.
fn explain(err: BookmarkUpError, store_path: &Path) -> Report {
    let hint = match &err {
        BookmarkUpError::Io { source, .. } if source.kind() == ErrorKind::NotFound => Some(format!(
            "no bookmarks file at {}; pass --bookmarks or set store.bookmarks_path",
            store_path.display()
        )),
        BookmarkUpError::Io { source, .. } if source.kind() == ErrorKind::PermissionDenied => {
            Some("check that you may read and write the bookmarks file and the backup directory".into())
        }
        BookmarkUpError::MalformedTree { .. } | BookmarkUpError::Json { .. } => {
            Some("the file does not look like a Chromium-style Bookmarks file".into())
        }
        BookmarkUpError::EmptyInput => Some("pass --allow-empty to write an empty tree anyway".into()),
        _ => None,
    };

    let report = Report::new(err);
    match hint {
        Some(hint) => report.suggestion(hint),
        None => report,
    }
}

fn print_folders(folders: &[FolderSummary]) {
    let width = folders.iter().map(|f| f.name.chars().count()).max().unwrap_or(0);
    for folder in folders {
        println!("    {:<width$}  {:>4}", folder.name, folder.size);
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporters
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn grouped(&self, bookmarks: usize, groups: usize) {
        self.spinner
            .set_message(format!("Grouped {bookmarks} bookmarks into {groups} folders"));
    }

    fn done(&self, _result: &Reorganized) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

/// Reporter for commands whose stdout must stay machine-readable.
struct QuietProgress;

impl ProgressReporter for QuietProgress {
    fn phase(&self, _name: &str) {}
    fn grouped(&self, _bookmarks: usize, _groups: usize) {}
    fn done(&self, _result: &Reorganized) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_organize_flags() {
        let cli = Cli::try_parse_from([
            "bookmarkup",
            "--bookmarks",
            "/tmp/Bookmarks",
            "organize",
            "--yes",
            "--backup",
            "both",
        ])
        .expect("parse");

        assert_eq!(cli.bookmarks, Some(PathBuf::from("/tmp/Bookmarks")));
        match cli.command {
            Command::Organize {
                yes, backup, allow_empty, ..
            } => {
                assert!(yes);
                assert!(matches!(backup, Some(BackupArg::Both)));
                assert!(!allow_empty);
            }
            _ => panic!("expected organize"),
        }
    }
}
