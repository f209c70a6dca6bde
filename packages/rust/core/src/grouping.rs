//! Keyword grouping and small-group consolidation.
//!
//! Every bookmark is keyed by the lexicographically smallest keyword of its
//! title (or the misc key when it has none). Groups keep the order in which
//! their keys were first produced, and members keep extraction order, so the
//! result is identical on every run for the same input.

use std::collections::HashMap;

use tracing::debug;

use bookmarkup_shared::{BookmarkRecord, GroupingConfig};

use crate::keywords::KeywordExtractor;

/// Key of the catch-all group.
pub const MISC_KEY: &str = "misc";

/// Groups with fewer members than this are folded into misc.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;

/// Consolidation policy.
#[derive(Debug, Clone)]
pub struct GroupingOptions {
    /// Minimum members for a group to keep its own folder.
    pub min_group_size: usize,
    /// Key of the catch-all group.
    pub misc_key: String,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            misc_key: MISC_KEY.to_string(),
        }
    }
}

impl From<&GroupingConfig> for GroupingOptions {
    fn from(config: &GroupingConfig) -> Self {
        Self {
            min_group_size: config.min_group_size,
            misc_key: config.misc_key.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// A group key and the bookmarks assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub key: String,
    pub members: Vec<&'a BookmarkRecord>,
}

/// Groups in first-key-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Groups<'a> {
    groups: Vec<Group<'a>>,
    index: HashMap<String, usize>,
}

impl<'a> Groups<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `members` to the group `key`, creating it at the end if needed.
    pub fn extend(&mut self, key: &str, members: impl IntoIterator<Item = &'a BookmarkRecord>) {
        let slot = match self.index.get(key).copied() {
            Some(slot) => slot,
            None => {
                self.groups.push(Group {
                    key: key.to_string(),
                    members: Vec::new(),
                });
                self.index.insert(key.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].members.extend(members);
    }

    /// Append one bookmark to the group `key`.
    pub fn push(&mut self, key: &str, record: &'a BookmarkRecord) {
        self.extend(key, [record]);
    }

    pub fn get(&self, key: &str) -> Option<&Group<'a>> {
        self.index.get(key).map(|&slot| &self.groups[slot])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group<'a>> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total bookmarks across all groups.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }
}

impl<'a, 'g> IntoIterator for &'g Groups<'a> {
    type Item = &'g Group<'a>;
    type IntoIter = std::slice::Iter<'g, Group<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl<'a> IntoIterator for Groups<'a> {
    type Item = Group<'a>;
    type IntoIter = std::vec::IntoIter<Group<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

// ---------------------------------------------------------------------------
// GroupingEngine
// ---------------------------------------------------------------------------

/// Assigns bookmarks to keyword groups.
#[derive(Debug, Clone, Default)]
pub struct GroupingEngine {
    extractor: KeywordExtractor,
    options: GroupingOptions,
}

impl GroupingEngine {
    pub fn new(extractor: KeywordExtractor, options: GroupingOptions) -> Self {
        Self { extractor, options }
    }

    pub fn options(&self) -> &GroupingOptions {
        &self.options
    }

    /// The group key for a title: its smallest keyword, or the misc key.
    pub fn group_key(&self, title: &str) -> String {
        self.extractor
            .keywords(title)
            .into_iter()
            .min()
            .unwrap_or_else(|| self.options.misc_key.clone())
    }

    /// Assign and consolidate.
    pub fn group<'a>(&self, records: &[&'a BookmarkRecord]) -> Groups<'a> {
        let assigned = self.assign(records);
        self.consolidate(assigned)
    }

    /// Assign every record to the group of its key, without consolidation.
    pub fn assign<'a>(&self, records: &[&'a BookmarkRecord]) -> Groups<'a> {
        let mut groups = Groups::new();
        for &record in records {
            let key = self.group_key(&record.name);
            groups.push(&key, record);
        }
        debug!(groups = groups.len(), "assigned bookmarks to keyword groups");
        groups
    }

    /// Fold groups below the minimum size into misc.
    ///
    /// Groups are scanned in order into a fresh collection, so misc lands
    /// where the first undersized group (or misc itself) was met.
    pub fn consolidate<'a>(&self, groups: Groups<'a>) -> Groups<'a> {
        let misc = self.options.misc_key.as_str();
        let mut merged = Groups::new();
        let mut folded = 0usize;

        for group in groups {
            if group.key == misc || group.members.len() >= self.options.min_group_size {
                merged.extend(&group.key, group.members);
            } else {
                folded += 1;
                merged.extend(misc, group.members);
            }
        }

        debug!(
            folded,
            remaining = merged.len(),
            "consolidated undersized groups"
        );
        merged
    }
}
