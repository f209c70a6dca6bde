//! Flattens a bookmark tree into its leaf bookmarks.

use serde_json::Value;

use bookmarkup_shared::{BookmarkRecord, BookmarkTree, Node, Result, TreeItem};

/// All bookmarks under `root`, depth-first, in encounter order.
///
/// Folders are walked child by child; containers are walked entry by entry.
/// The returned records borrow from `root`.
pub fn extract(root: &Node) -> Vec<&BookmarkRecord> {
    let mut out = Vec::new();
    walk_node(root, &mut out);
    out
}

/// All bookmarks in a rebuilt tree, root by root.
pub fn extract_tree(tree: &BookmarkTree) -> Vec<&BookmarkRecord> {
    let mut out = Vec::new();
    for (_, folder) in tree.roots.iter() {
        walk_items(&folder.children, &mut out);
    }
    out
}

/// Decode raw JSON and extract owned copies of its bookmarks.
pub fn extract_json(value: &Value) -> Result<Vec<BookmarkRecord>> {
    let root = Node::from_json(value)?;
    Ok(extract(&root).into_iter().cloned().collect())
}

fn walk_node<'a>(node: &'a Node, out: &mut Vec<&'a BookmarkRecord>) {
    match node {
        Node::Url(record) => out.push(record),
        Node::Folder(folder) => walk_items(&folder.children, out),
        Node::Container(container) => {
            for (_, child) in &container.entries {
                walk_node(child, out);
            }
        }
    }
}

fn walk_items<'a>(items: &'a [TreeItem], out: &mut Vec<&'a BookmarkRecord>) {
    for item in items {
        match item {
            TreeItem::Url(record) => out.push(record),
            TreeItem::Folder(folder) => walk_items(&folder.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmarkup_shared::{BookmarkUpError, SourceDocument};
    use serde_json::json;

    fn bookmark(name: &str, url: &str) -> Value {
        json!({ "type": "url", "name": name, "url": url, "date_added": "13300000000000000" })
    }

    #[test]
    fn walks_nested_folders_in_order() {
        let folder = json!({
            "type": "folder",
            "name": "Bar",
            "children": [
                bookmark("One", "https://one.example"),
                {
                    "type": "folder",
                    "name": "Nested",
                    "children": [
                        bookmark("Two", "https://two.example"),
                        { "type": "folder", "name": "Deeper", "children": [bookmark("Three", "https://three.example")] }
                    ]
                },
                bookmark("Four", "https://four.example")
            ]
        });

        let records = extract_json(&folder).expect("extract");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Two", "Three", "Four"]);
    }

    #[test]
    fn root_without_children_walks_named_containers() {
        let roots = json!({
            "bookmark_bar": { "type": "folder", "name": "Bookmarks bar", "children": [bookmark("A", "https://a.example")] },
            "other": { "type": "folder", "name": "Other bookmarks", "children": [bookmark("B", "https://b.example")] },
            "synced": { "type": "folder", "name": "Mobile bookmarks", "children": [
                { "type": "folder", "name": "Phone", "children": [bookmark("C", "https://c.example")] }
            ] }
        });

        let node = Node::from_json(&roots).expect("decode");
        let urls: Vec<_> = extract(&node).iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls.len(), 3);
        for url in ["https://a.example", "https://b.example", "https://c.example"] {
            assert!(urls.contains(&url), "missing {url}");
        }
    }

    #[test]
    fn extracts_from_whole_document() {
        let doc = SourceDocument::from_json(&json!({
            "checksum": "x",
            "version": 1,
            "roots": {
                "bookmark_bar": { "type": "folder", "children": [bookmark("A", "https://a.example")] },
                "other": { "type": "folder", "children": [] },
                "synced": { "type": "folder", "children": [] }
            }
        }))
        .expect("decode");
        assert_eq!(extract(&doc.roots).len(), 1);
    }

    #[test]
    fn returns_references_into_the_input() {
        let node = Node::from_json(&json!({
            "type": "folder",
            "children": [bookmark("A", "https://a.example")]
        }))
        .expect("decode");

        let records = extract(&node);
        let Node::Folder(folder) = &node else {
            panic!("expected folder");
        };
        let TreeItem::Url(original) = &folder.children[0] else {
            panic!("expected bookmark");
        };
        assert!(std::ptr::eq(records[0], original));
    }

    #[test]
    fn malformed_child_fails_instead_of_skipping() {
        let err = extract_json(&json!({
            "type": "folder",
            "children": [{ "name": "No type", "url": "https://x.example" }]
        }))
        .unwrap_err();
        assert!(matches!(err, BookmarkUpError::MalformedTree { .. }));
    }

    #[test]
    fn empty_folders_yield_nothing() {
        let records = extract_json(&json!({ "type": "folder", "children": [] })).expect("extract");
        assert!(records.is_empty());
    }
}
