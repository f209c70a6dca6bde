//! Rebuilds a store tree from keyword groups.
//!
//! The rebuilt tree always has the three permanent roots. Every group becomes
//! one folder under `bookmark_bar`, in group order; `other` and `synced` are
//! emptied. Bookmarks are cloned into the new tree unchanged.

use serde_json::Value;
use tracing::debug;

use bookmarkup_shared::{
    BookmarkTree, DEFAULT_VERSION, FolderNode, GroupingConfig, Roots, SourceDocument, TreeItem,
};

use crate::grouping::{Group, Groups};

/// Default names Chromium gives the permanent roots.
const BOOKMARK_BAR_NAME: &str = "Bookmarks bar";
const OTHER_NAME: &str = "Other bookmarks";
const SYNCED_NAME: &str = "Mobile bookmarks";

/// Builds [`BookmarkTree`]s from grouped bookmarks.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    folder_prefix: String,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every synthesized folder name.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.folder_prefix = prefix.into();
        self
    }

    /// Folder name for a group key.
    pub fn folder_name(&self, key: &str) -> String {
        format!("{}{}", self.folder_prefix, capitalize_first(key))
    }

    /// Build the replacement tree for `original`.
    ///
    /// `checksum` and `version` are carried over from `original`, defaulting
    /// to `""` and `1`. Permanent roots keep their original name and
    /// identifying fields when present.
    pub fn build(&self, original: &SourceDocument, groups: &Groups<'_>) -> BookmarkTree {
        let children: Vec<TreeItem> = groups
            .iter()
            .map(|group| TreeItem::Folder(self.group_folder(group)))
            .collect();

        debug!(folders = children.len(), "built group folders");

        BookmarkTree {
            checksum: original
                .checksum
                .clone()
                .unwrap_or_else(|| Value::String(String::new())),
            roots: Roots {
                bookmark_bar: permanent_root(original, "bookmark_bar", BOOKMARK_BAR_NAME, children),
                other: permanent_root(original, "other", OTHER_NAME, Vec::new()),
                synced: permanent_root(original, "synced", SYNCED_NAME, Vec::new()),
            },
            version: original
                .version
                .clone()
                .unwrap_or_else(|| Value::from(DEFAULT_VERSION)),
        }
    }

    fn group_folder(&self, group: &Group<'_>) -> FolderNode {
        FolderNode {
            name: self.folder_name(&group.key),
            children: group
                .members
                .iter()
                .map(|&record| TreeItem::Url(record.clone()))
                .collect(),
            date_added: group.members.first().and_then(|r| r.date_added.clone()),
            extra: Default::default(),
        }
    }
}

impl From<&GroupingConfig> for TreeBuilder {
    fn from(config: &GroupingConfig) -> Self {
        Self::new().with_prefix(config.folder_prefix.clone())
    }
}

/// Upper-case the first character of `key`, leaving the rest untouched.
pub fn capitalize_first(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn permanent_root(
    original: &SourceDocument,
    key: &str,
    default_name: &str,
    children: Vec<TreeItem>,
) -> FolderNode {
    match original.root_folder(key) {
        Some(folder) => FolderNode {
            name: if folder.name.is_empty() {
                default_name.to_string()
            } else {
                folder.name.clone()
            },
            children,
            date_added: folder.date_added.clone(),
            extra: folder.extra.clone(),
        },
        None => FolderNode {
            children,
            ..FolderNode::new(default_name)
        },
    }
}
