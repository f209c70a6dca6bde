//! Recovery snapshots written before the store is replaced.

use std::path::{Path, PathBuf};

use chrono::Local;
use sha2::{Digest, Sha256};
use tracing::info;

use bookmarkup_shared::{BackupFormat, BookmarkUpError, Result};

use crate::BookmarkStore;
use crate::html;

/// File name stem shared by every snapshot.
const SNAPSHOT_PREFIX: &str = "BookmarkUp_Backup";

/// A snapshot written to disk.
#[derive(Debug, Clone)]
pub struct SnapshotReceipt {
    /// Where the snapshot was written.
    pub path: PathBuf,
    /// SHA-256 of the written bytes (hex).
    pub sha256: String,
    /// Size in bytes.
    pub bytes: usize,
}

/// One way of capturing the current store so it can be restored later.
pub trait SnapshotWriter {
    /// Short name used in logs.
    fn label(&self) -> &'static str;
    /// Extension of snapshot files, without the dot.
    fn extension(&self) -> &'static str;
    /// Snapshot contents for the store as it is now.
    fn render(&self, store: &BookmarkStore) -> Result<Vec<u8>>;
}

/// Byte-for-byte copy of the store file.
pub struct RawCopy;

impl SnapshotWriter for RawCopy {
    fn label(&self) -> &'static str {
        "raw"
    }

    fn extension(&self) -> &'static str {
        "bak"
    }

    fn render(&self, store: &BookmarkStore) -> Result<Vec<u8>> {
        store.load_raw()
    }
}

/// Netscape bookmark HTML, importable by any browser.
pub struct HtmlExport;

impl SnapshotWriter for HtmlExport {
    fn label(&self) -> &'static str {
        "html"
    }

    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, store: &BookmarkStore) -> Result<Vec<u8>> {
        let document = store.load()?;
        Ok(html::render(&document).into_bytes())
    }
}

/// Write the snapshots selected by `format` into `dir`.
pub fn create_snapshots(
    store: &BookmarkStore,
    format: BackupFormat,
    dir: &Path,
) -> Result<Vec<SnapshotReceipt>> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let writers: Vec<Box<dyn SnapshotWriter>> = match format {
        BackupFormat::Raw => vec![Box::new(RawCopy)],
        BackupFormat::Html => vec![Box::new(HtmlExport)],
        BackupFormat::Both => vec![Box::new(RawCopy), Box::new(HtmlExport)],
    };

    writers
        .iter()
        .map(|writer| write_snapshot(writer.as_ref(), store, dir, &stamp))
        .collect()
}

/// Render one snapshot and write it to `dir`, never overwriting an
/// existing file.
pub fn write_snapshot(
    writer: &dyn SnapshotWriter,
    store: &BookmarkStore,
    dir: &Path,
    stamp: &str,
) -> Result<SnapshotReceipt> {
    let content = writer.render(store)?;

    std::fs::create_dir_all(dir).map_err(|e| BookmarkUpError::io(dir, e))?;
    let path = free_path(dir, stamp, writer.extension());
    std::fs::write(&path, &content).map_err(|e| BookmarkUpError::io(&path, e))?;

    let receipt = SnapshotReceipt {
        sha256: sha256_hex(&content),
        bytes: content.len(),
        path,
    };
    info!(
        kind = writer.label(),
        path = %receipt.path.display(),
        bytes = receipt.bytes,
        "wrote recovery snapshot"
    );
    Ok(receipt)
}

/// First `<prefix>_<stamp>[_n].<ext>` in `dir` that does not exist yet.
fn free_path(dir: &Path, stamp: &str, extension: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{SNAPSHOT_PREFIX}_{stamp}.{extension}"));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{SNAPSHOT_PREFIX}_{stamp}_{n}.{extension}"));
        n += 1;
    }
    candidate
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
