//! Shared types, error model, and configuration for BookmarkUp.
//!
//! This crate is the foundation depended on by all other BookmarkUp crates.
//! It provides:
//! - [`BookmarkUpError`], the unified error type
//! - The bookmark tree model ([`Node`], [`BookmarkRecord`], [`FolderNode`], [`BookmarkTree`])
//! - Configuration ([`AppConfig`], [`GroupingConfig`], config loading)

pub mod config;
pub mod error;
pub mod tree;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BackupConfig, BackupFormat, GroupingConfig, StoreConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{BookmarkUpError, Result};
pub use tree::{
    BookmarkRecord, BookmarkTree, ContainerMap, DEFAULT_VERSION, FolderNode, Node, Roots,
    SourceDocument, Timestamp, TreeItem,
};
