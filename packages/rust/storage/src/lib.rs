//! Bookmark store persistence and recovery snapshots.
//!
//! The [`BookmarkStore`] reads a browser's `Bookmarks` JSON file and replaces
//! it atomically with a rebuilt tree. Before replacing, callers write one or
//! more recovery snapshots via [`create_snapshots`].

mod backup;
mod html;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use bookmarkup_shared::{BookmarkTree, BookmarkUpError, Result, SourceDocument};

pub use backup::{HtmlExport, RawCopy, SnapshotReceipt, SnapshotWriter, create_snapshots, write_snapshot};

/// Suffix of the sibling file written before the rename in [`BookmarkStore::save`].
const TEMP_SUFFIX: &str = ".bookmarkup-tmp";

/// Handle to a `Bookmarks` JSON file on disk.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    path: PathBuf,
}

impl BookmarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes of the store file.
    pub fn load_raw(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| BookmarkUpError::io(&self.path, e))
    }

    /// The store parsed as JSON.
    pub fn load_json(&self) -> Result<Value> {
        let bytes = self.load_raw()?;
        serde_json::from_slice(&bytes).map_err(|e| {
            BookmarkUpError::json(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    /// The store decoded into a [`SourceDocument`].
    pub fn load(&self) -> Result<SourceDocument> {
        let value = self.load_json()?;
        let document = SourceDocument::from_json(&value)?;
        debug!(path = %self.path.display(), "loaded bookmark store");
        Ok(document)
    }

    /// Replace the store with `tree`.
    ///
    /// The tree is written to a sibling temp file which is then renamed over
    /// the store, so readers never see a half-written file.
    pub fn save(&self, tree: &BookmarkTree) -> Result<()> {
        let mut content = serde_json::to_string_pretty(tree)?;
        content.push('\n');

        let tmp = self.temp_path();
        std::fs::write(&tmp, content.as_bytes()).map_err(|e| BookmarkUpError::io(&tmp, e))?;

        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(BookmarkUpError::io(&self.path, e));
        }

        info!(path = %self.path.display(), bytes = content.len(), "saved bookmark store");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "Bookmarks".into());
        name.push(TEMP_SUFFIX);
        self.path.with_file_name(name)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{sample_store, temp_dir};
    use super::*;
    use bookmarkup_shared::{BookmarkRecord, FolderNode, Roots, TreeItem};
    use serde_json::json;

    #[test]
    fn load_decodes_store() {
        let tmp = temp_dir("store");
        let path = tmp.join("Bookmarks");
        std::fs::write(&path, sample_store().to_string()).unwrap();

        let doc = BookmarkStore::new(&path).load().unwrap();
        assert_eq!(doc.checksum, Some(json!("abc123")));
        assert_eq!(doc.root_folder("bookmark_bar").unwrap().children.len(), 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let tmp = temp_dir("store");
        let path = tmp.join("Missing");

        let err = BookmarkStore::new(&path).load().unwrap_err();
        match err {
            BookmarkUpError::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_rejects_invalid_json() {
        let tmp = temp_dir("store");
        let path = tmp.join("Bookmarks");
        std::fs::write(&path, "{ not json").unwrap();

        let err = BookmarkStore::new(&path).load().unwrap_err();
        assert!(matches!(err, BookmarkUpError::Json { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn save_replaces_store_and_cleans_up() {
        let tmp = temp_dir("store");
        let path = tmp.join("Bookmarks");
        std::fs::write(&path, sample_store().to_string()).unwrap();

        let mut folder = FolderNode::new("Rust");
        folder.children.push(TreeItem::Url(BookmarkRecord::new(
            "Rust Book",
            "https://doc.rust-lang.org/book/",
        )));
        let mut bar = FolderNode::new("Bookmarks bar");
        bar.children.push(TreeItem::Folder(folder));
        let tree = BookmarkTree {
            checksum: json!("abc123"),
            roots: Roots {
                bookmark_bar: bar,
                other: FolderNode::new("Other bookmarks"),
                synced: FolderNode::new("Mobile bookmarks"),
            },
            version: json!(1),
        };

        let store = BookmarkStore::new(&path);
        store.save(&tree).unwrap();

        let written: BookmarkTree =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, tree);
        assert!(!store.temp_path().exists());

        // The rewritten store decodes like any other.
        let doc = store.load().unwrap();
        assert_eq!(doc.root_folder("bookmark_bar").unwrap().children.len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
