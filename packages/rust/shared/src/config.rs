//! Application configuration for BookmarkUp.
//!
//! User config lives at `~/.bookmarkup/bookmarkup.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BookmarkUpError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "bookmarkup.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".bookmarkup";

// ---------------------------------------------------------------------------
// Config structs (matching bookmarkup.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bookmark store location and owning browser.
    #[serde(default)]
    pub store: StoreConfig,

    /// Keyword and grouping policy.
    #[serde(default)]
    pub grouping: GroupingConfig,

    /// Recovery snapshot settings.
    #[serde(default)]
    pub backup: BackupConfig,
}

/// `[store]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the browser's `Bookmarks` JSON file. `~/` is expanded.
    #[serde(default = "default_bookmarks_path")]
    pub bookmarks_path: String,

    /// Substring matched against running process names before writing.
    #[serde(default = "default_browser_process")]
    pub browser_process: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bookmarks_path: default_bookmarks_path(),
            browser_process: default_browser_process(),
        }
    }
}

impl StoreConfig {
    /// The bookmarks path with a leading `~/` expanded.
    pub fn bookmarks_path(&self) -> PathBuf {
        expand_home(&self.bookmarks_path)
    }
}

fn default_bookmarks_path() -> String {
    let profile = if cfg!(target_os = "windows") {
        "BraveSoftware/Brave-Browser/User Data/Default/Bookmarks"
    } else {
        "BraveSoftware/Brave-Browser/Default/Bookmarks"
    };
    let base = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        dirs::config_dir()
    };
    match base {
        Some(base) => base.join(profile).to_string_lossy().into_owned(),
        None => format!("~/{profile}"),
    }
}
fn default_browser_process() -> String {
    "Brave".into()
}

/// `[grouping]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Groups smaller than this are folded into the misc group.
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,

    /// Keywords must be strictly longer than this many characters.
    #[serde(default = "default_min_keyword_len")]
    pub min_keyword_len: usize,

    /// Key of the catch-all group.
    #[serde(default = "default_misc_key")]
    pub misc_key: String,

    /// Text prepended to every synthesized folder name.
    #[serde(default)]
    pub folder_prefix: String,

    /// Words ignored in addition to the built-in English stopwords.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            min_group_size: default_min_group_size(),
            min_keyword_len: default_min_keyword_len(),
            misc_key: default_misc_key(),
            folder_prefix: String::new(),
            extra_stopwords: Vec::new(),
        }
    }
}

fn default_min_group_size() -> usize {
    2
}
fn default_min_keyword_len() -> usize {
    3
}
fn default_misc_key() -> String {
    "misc".into()
}

/// Which recovery snapshot(s) to write before replacing the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFormat {
    /// Byte-for-byte copy of the store file.
    #[default]
    Raw,
    /// Netscape bookmark HTML export, importable by any browser.
    Html,
    /// Both of the above.
    Both,
}

/// `[backup]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Snapshot format.
    #[serde(default)]
    pub format: BackupFormat,

    /// Directory receiving snapshots. `~/` is expanded.
    #[serde(default = "default_backup_dir")]
    pub dir: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            format: BackupFormat::default(),
            dir: default_backup_dir(),
        }
    }
}

impl BackupConfig {
    /// The backup directory with a leading `~/` expanded.
    pub fn dir(&self) -> PathBuf {
        expand_home(&self.dir)
    }
}

fn default_backup_dir() -> String {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".into())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.bookmarkup/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BookmarkUpError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.bookmarkup/bookmarkup.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BookmarkUpError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        BookmarkUpError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.grouping.misc_key.is_empty() {
        return Err(BookmarkUpError::config("grouping.misc_key must not be empty"));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BookmarkUpError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| BookmarkUpError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BookmarkUpError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("bookmarks_path"));
        assert!(toml_str.contains("min_group_size"));
        assert!(toml_str.contains("format = \"raw\""));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.grouping.min_group_size, 2);
        assert_eq!(parsed.grouping.min_keyword_len, 3);
        assert_eq!(parsed.grouping.misc_key, "misc");
        assert_eq!(parsed.store.browser_process, "Brave");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[grouping]
folder_prefix = "Up "
extra_stopwords = ["github", "youtube"]

[backup]
format = "both"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.grouping.folder_prefix, "Up ");
        assert_eq!(config.grouping.extra_stopwords.len(), 2);
        assert_eq!(config.grouping.misc_key, "misc");
        assert_eq!(config.backup.format, BackupFormat::Both);
        assert!(config.store.bookmarks_path.ends_with("Bookmarks"));
    }

    #[test]
    fn empty_misc_key_rejected() {
        let path = std::env::temp_dir().join(format!(
            "bookmarkup-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[grouping]\nmisc_key = \"\"\n").unwrap();

        let result = load_config_from(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("misc_key"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn home_prefix_is_expanded() {
        let store = StoreConfig {
            bookmarks_path: "~/Bookmarks".into(),
            browser_process: "Brave".into(),
        };
        let expanded = store.bookmarks_path();
        if dirs::home_dir().is_some() {
            assert!(!expanded.starts_with("~"));
        }
        assert!(expanded.ends_with("Bookmarks"));
    }
}
