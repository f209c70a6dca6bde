//! End-to-end reorganize pipeline: decoded store → extract → group → build.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use bookmarkup_shared::{AppConfig, BookmarkRecord, BookmarkTree, BookmarkUpError, Result, SourceDocument};

use crate::builder::TreeBuilder;
use crate::extract::{extract, extract_tree};
use crate::grouping::{GroupingEngine, GroupingOptions};
use crate::keywords::KeywordExtractor;

/// Configuration for the `reorganize` pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReorganizeConfig {
    /// Title keyword extraction.
    pub keywords: KeywordExtractor,
    /// Consolidation policy.
    pub grouping: GroupingOptions,
    /// Prefix for synthesized folder names.
    pub folder_prefix: String,
    /// Produce an all-empty tree instead of failing when nothing was found.
    pub allow_empty: bool,
}

impl From<&AppConfig> for ReorganizeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            keywords: KeywordExtractor::from(&config.grouping),
            grouping: GroupingOptions::from(&config.grouping),
            folder_prefix: config.grouping.folder_prefix.clone(),
            allow_empty: false,
        }
    }
}

/// One synthesized folder in the rebuilt tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    /// Group key.
    pub key: String,
    /// Folder display name.
    pub name: String,
    /// Number of bookmarks in the folder.
    pub size: usize,
}

/// Result of the `reorganize` pipeline.
#[derive(Debug)]
pub struct Reorganized {
    /// The replacement store tree.
    pub tree: BookmarkTree,
    /// Number of bookmarks extracted from the source.
    pub bookmark_count: usize,
    /// Synthesized folders, in tree order.
    pub folders: Vec<FolderSummary>,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once bookmarks are grouped.
    fn grouped(&self, bookmarks: usize, groups: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &Reorganized);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn grouped(&self, _bookmarks: usize, _groups: usize) {}
    fn done(&self, _result: &Reorganized) {}
}

/// Run the full reorganize pipeline.
///
/// 1. Extract every bookmark from the source roots
/// 2. Group by smallest title keyword and consolidate small groups
/// 3. Build the replacement tree
/// 4. Check that every bookmark made it into the new tree exactly once
#[instrument(skip_all, fields(allow_empty = config.allow_empty))]
pub fn reorganize(
    document: &SourceDocument,
    config: &ReorganizeConfig,
    progress: &dyn ProgressReporter,
) -> Result<Reorganized> {
    // --- Phase 1: Extract ---
    progress.phase("Extracting bookmarks");
    let records = extract(&document.roots);
    info!(bookmarks = records.len(), "extracted bookmarks");

    if records.is_empty() {
        if !config.allow_empty {
            return Err(BookmarkUpError::EmptyInput);
        }
        warn!("no bookmarks found, writing an empty tree");
    }

    // --- Phase 2: Group ---
    progress.phase("Grouping by keyword");
    let engine = GroupingEngine::new(config.keywords.clone(), config.grouping.clone());
    let groups = engine.group(&records);
    for group in &groups {
        debug!(key = %group.key, size = group.members.len(), "group");
    }
    progress.grouped(records.len(), groups.len());
    info!(groups = groups.len(), "grouped bookmarks");

    // --- Phase 3: Build ---
    progress.phase("Building new tree");
    let builder = TreeBuilder::new().with_prefix(config.folder_prefix.clone());
    let tree = builder.build(document, &groups);

    verify_conservation(&records, &tree)?;

    let folders = groups
        .iter()
        .map(|group| FolderSummary {
            key: group.key.clone(),
            name: builder.folder_name(&group.key),
            size: group.members.len(),
        })
        .collect();

    let result = Reorganized {
        tree,
        bookmark_count: records.len(),
        folders,
    };
    progress.done(&result);

    Ok(result)
}

/// Check that `tree` holds exactly the bookmarks in `source`, as a multiset of URLs.
pub fn verify_conservation(source: &[&BookmarkRecord], tree: &BookmarkTree) -> Result<()> {
    let mut before: Vec<&str> = source.iter().map(|r| r.url.as_str()).collect();
    let mut after: Vec<&str> = extract_tree(tree).iter().map(|r| r.url.as_str()).collect();

    if before.len() != after.len() {
        return Err(BookmarkUpError::validation(format!(
            "rebuilt tree has {} bookmarks, source had {}",
            after.len(),
            before.len()
        )));
    }

    before.sort_unstable();
    after.sort_unstable();
    if before != after {
        return Err(BookmarkUpError::validation(
            "rebuilt tree does not contain the same bookmarks as the source",
        ));
    }

    Ok(())
}
