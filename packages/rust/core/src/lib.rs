//! Grouping and restructuring pipeline for BookmarkUp.
//!
//! The pipeline is a pure, single-pass transformation over an already-decoded
//! bookmark store: extract leaf bookmarks, cluster them by title keyword,
//! fold undersized clusters into a catch-all, and rebuild the store tree.

pub mod builder;
pub mod extract;
pub mod grouping;
pub mod keywords;
pub mod pipeline;
mod stopwords;
