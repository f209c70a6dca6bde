//! Bookmark tree model and decoding.
//!
//! Chromium stores bookmarks as a JSON document whose `roots` object holds the
//! permanent containers (`bookmark_bar`, `other`, `synced`). Every container
//! is a folder node with `children`, and leaves are `"type": "url"` records.
//!
//! Input is decoded into the [`Node`] tagged union so that traversal never has
//! to probe raw JSON. Fields this crate does not interpret (`id`, `guid`,
//! `meta_info`, ...) ride along in each node's `extra` map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BookmarkUpError, Result};

/// Store format version written when the source document has none.
pub const DEFAULT_VERSION: u64 = 1;

/// Microseconds between 1601-01-01 (Chromium epoch) and 1970-01-01.
const CHROMIUM_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Opaque `date_added` token, passed through exactly as read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub Value);

impl Timestamp {
    /// Microseconds since 1601-01-01 UTC, if the token is numeric.
    pub fn chromium_micros(&self) -> Option<i64> {
        match &self.0 {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Interpret the token as a Chromium timestamp.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let micros = self.chromium_micros()?;
        DateTime::from_timestamp_micros(micros.checked_sub(CHROMIUM_EPOCH_OFFSET_MICROS)?)
    }

    /// Seconds since the Unix epoch, as used by `ADD_DATE` in HTML exports.
    pub fn to_unix_seconds(&self) -> Option<i64> {
        self.to_datetime().map(|dt| dt.timestamp())
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Self(Value::String(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A leaf bookmark (`"type": "url"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    /// Display title.
    pub name: String,
    /// Target URL.
    pub url: String,
    /// Creation time token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<Timestamp>,
    /// Every other key of the source object.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BookmarkRecord {
    /// Create a bookmark with no timestamp or extra fields.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            date_added: None,
            extra: Map::new(),
        }
    }

    /// Set the `date_added` token.
    pub fn with_date_added(mut self, date_added: impl Into<Timestamp>) -> Self {
        self.date_added = Some(date_added.into());
        self
    }
}

/// A folder (`"type": "folder"`) holding bookmarks and nested folders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<TreeItem>,
    /// Creation time token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<Timestamp>,
    /// Every other key of the source object.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FolderNode {
    /// Create an empty folder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// An entry of a folder's `children` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeItem {
    Url(BookmarkRecord),
    Folder(FolderNode),
}

/// A mapping of named sub-nodes with neither `type` nor `children`,
/// such as the `roots` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerMap {
    /// Named nodes, in document order.
    pub entries: Vec<(String, Node)>,
}

impl ContainerMap {
    /// Look up a named sub-node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, node)| node)
    }
}

/// Any node of an input tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Url(BookmarkRecord),
    Folder(FolderNode),
    Container(ContainerMap),
}

impl From<TreeItem> for Node {
    fn from(item: TreeItem) -> Self {
        match item {
            TreeItem::Url(record) => Node::Url(record),
            TreeItem::Folder(folder) => Node::Folder(folder),
        }
    }
}

impl Node {
    /// Decode a node from parsed JSON.
    ///
    /// Typed objects become bookmarks or folders, untyped objects with
    /// `children` become folders, and any other object is a container whose
    /// object-valued entries are decoded recursively.
    pub fn from_json(value: &Value) -> Result<Self> {
        decode_node(value, "")
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// A decoded bookmark store as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    /// Opaque checksum, if present.
    pub checksum: Option<Value>,
    /// Opaque format version, if present.
    pub version: Option<Value>,
    /// The `roots` container (or the whole document when `roots` is absent).
    pub roots: Node,
}

impl SourceDocument {
    /// Decode a store document from parsed JSON.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = as_object(value, "")?;
        let roots = match map.get("roots") {
            Some(roots) => decode_node(roots, "/roots")?,
            None => {
                tracing::debug!("document has no `roots` key, treating it as a container");
                decode_node(value, "")?
            }
        };

        Ok(Self {
            checksum: map.get("checksum").cloned(),
            version: map.get("version").cloned(),
            roots,
        })
    }

    /// The permanent folder stored under `roots.<name>`, if any.
    pub fn root_folder(&self, name: &str) -> Option<&FolderNode> {
        match &self.roots {
            Node::Container(container) => match container.get(name) {
                Some(Node::Folder(folder)) => Some(folder),
                _ => None,
            },
            _ => None,
        }
    }
}

/// The store document produced by a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkTree {
    pub checksum: Value,
    pub roots: Roots,
    pub version: Value,
}

/// The three permanent containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roots {
    #[serde(with = "typed_folder")]
    pub bookmark_bar: FolderNode,
    #[serde(with = "typed_folder")]
    pub other: FolderNode,
    #[serde(with = "typed_folder")]
    pub synced: FolderNode,
}

impl Roots {
    /// Root names paired with their folders, in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FolderNode)> {
        [
            ("bookmark_bar", &self.bookmark_bar),
            ("other", &self.other),
            ("synced", &self.synced),
        ]
        .into_iter()
    }
}

/// (De)serializes a bare [`FolderNode`] with its `"type": "folder"` tag.
mod typed_folder {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{FolderNode, TreeItem};

    #[derive(Serialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum Tagged<'a> {
        Folder(&'a FolderNode),
    }

    pub(super) fn serialize<S: Serializer>(
        folder: &FolderNode,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        Tagged::Folder(folder).serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<FolderNode, D::Error> {
        match TreeItem::deserialize(deserializer)? {
            TreeItem::Folder(folder) => Ok(folder),
            TreeItem::Url(_) => Err(D::Error::custom("permanent root must be a folder")),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding helpers
// ---------------------------------------------------------------------------

fn decode_node(value: &Value, path: &str) -> Result<Node> {
    let map = as_object(value, path)?;
    if map.contains_key("type") {
        return decode_item(value, path).map(Node::from);
    }
    if map.contains_key("children") {
        return decode_folder(map, path).map(Node::Folder);
    }

    let mut entries = Vec::new();
    for (key, child) in map {
        // Scalars and arrays next to nodes (checksum, version, sync state) are metadata.
        if child.is_object() {
            entries.push((key.clone(), decode_node(child, &format!("{path}/{key}"))?));
        }
    }
    Ok(Node::Container(ContainerMap { entries }))
}

fn decode_item(value: &Value, path: &str) -> Result<TreeItem> {
    let map = as_object(value, path)?;
    match map.get("type") {
        Some(Value::String(kind)) if kind == "url" => decode_bookmark(map, path).map(TreeItem::Url),
        Some(Value::String(kind)) if kind == "folder" => {
            decode_folder(map, path).map(TreeItem::Folder)
        }
        Some(Value::String(kind)) => Err(malformed(path, format!("unknown node type `{kind}`"))),
        Some(other) => Err(malformed(
            path,
            format!("`type` must be a string, found {}", kind_of(other)),
        )),
        None => Err(malformed(path, "missing `type`")),
    }
}

fn decode_bookmark(map: &Map<String, Value>, path: &str) -> Result<BookmarkRecord> {
    let name = required_str(map, "name", path)?;
    let url = required_str(map, "url", path)?;

    Ok(BookmarkRecord {
        name,
        url,
        date_added: timestamp(map),
        extra: passthrough(map, &["type", "name", "url", "date_added"]),
    })
}

fn decode_folder(map: &Map<String, Value>, path: &str) -> Result<FolderNode> {
    let children = match map.get("children") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_item(item, &format!("{path}/children/{i}")))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(malformed(
                path,
                format!("`children` must be an array, found {}", kind_of(other)),
            ));
        }
        None => return Err(malformed(path, "folder has no `children`")),
    };

    let name = match map.get("name") {
        Some(Value::String(name)) => name.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => {
            return Err(malformed(
                path,
                format!("`name` must be a string, found {}", kind_of(other)),
            ));
        }
    };

    Ok(FolderNode {
        name,
        children,
        date_added: timestamp(map),
        extra: passthrough(map, &["type", "name", "children", "date_added"]),
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        malformed(
            path,
            format!("expected an object, found {}", kind_of(value)),
        )
    })
}

fn required_str(map: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(malformed(
            path,
            format!("`{key}` must be a string, found {}", kind_of(other)),
        )),
        None => Err(malformed(path, format!("bookmark has no `{key}`"))),
    }
}

fn timestamp(map: &Map<String, Value>) -> Option<Timestamp> {
    map.get("date_added")
        .filter(|v| !v.is_null())
        .cloned()
        .map(Timestamp)
}

fn passthrough(map: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn malformed(path: &str, msg: impl Into<String>) -> BookmarkUpError {
    let path = if path.is_empty() { "/" } else { path };
    BookmarkUpError::malformed(path, msg)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_store() -> Value {
        json!({
            "checksum": "abc123",
            "roots": {
                "bookmark_bar": {
                    "children": [
                        {
                            "date_added": "13300000000000000",
                            "guid": "0a1b",
                            "id": "5",
                            "name": "Rust Book",
                            "type": "url",
                            "url": "https://doc.rust-lang.org/book/"
                        },
                        {
                            "children": [],
                            "name": "Empty",
                            "type": "folder"
                        }
                    ],
                    "id": "1",
                    "name": "Bookmarks bar",
                    "type": "folder"
                },
                "other": { "children": [], "name": "Other bookmarks", "type": "folder" },
                "synced": { "children": [], "name": "Mobile bookmarks", "type": "folder" }
            },
            "version": 1
        })
    }

    #[test]
    fn decodes_chromium_store() {
        let doc = SourceDocument::from_json(&sample_store()).expect("decode");
        assert_eq!(doc.checksum, Some(json!("abc123")));
        assert_eq!(doc.version, Some(json!(1)));

        let bar = doc.root_folder("bookmark_bar").expect("bookmark bar");
        assert_eq!(bar.name, "Bookmarks bar");
        assert_eq!(bar.extra.get("id"), Some(&json!("1")));
        assert_eq!(bar.children.len(), 2);

        match &bar.children[0] {
            TreeItem::Url(record) => {
                assert_eq!(record.name, "Rust Book");
                assert_eq!(record.extra.get("guid"), Some(&json!("0a1b")));
                assert!(!record.extra.contains_key("type"));
            }
            other => panic!("expected bookmark, got {other:?}"),
        }
    }

    #[test]
    fn untyped_child_is_malformed() {
        let value = json!({
            "roots": {
                "other": {
                    "children": [{ "name": "x", "url": "https://x.example" }],
                    "type": "folder"
                }
            }
        });
        let err = SourceDocument::from_json(&value).unwrap_err();
        match err {
            BookmarkUpError::MalformedTree { path, message } => {
                assert_eq!(path, "/roots/other/children/0");
                assert!(message.contains("type"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_type_and_missing_children_are_malformed() {
        let err = Node::from_json(&json!({ "type": "separator" })).unwrap_err();
        assert!(err.to_string().contains("unknown node type `separator`"));

        let err = Node::from_json(&json!({ "type": "folder", "name": "x" })).unwrap_err();
        assert!(err.to_string().contains("no `children`"));

        let err = Node::from_json(&json!({ "type": "url", "name": "x" })).unwrap_err();
        assert!(err.to_string().contains("no `url`"));
    }

    #[test]
    fn container_skips_scalar_metadata() {
        let node = Node::from_json(&json!({
            "sync_transaction_version": "7",
            "bookmark_bar": { "children": [], "type": "folder" }
        }))
        .expect("decode");

        match node {
            Node::Container(container) => {
                assert_eq!(container.entries.len(), 1);
                assert!(container.get("bookmark_bar").is_some());
            }
            other => panic!("expected container, got {other:?}"),
        }
    }

    #[test]
    fn document_without_roots_is_a_container() {
        let doc = SourceDocument::from_json(&json!({
            "bookmark_bar": { "children": [], "type": "folder" },
            "version": 1
        }))
        .expect("decode");
        assert!(matches!(doc.roots, Node::Container(_)));
        assert!(doc.checksum.is_none());
    }

    #[test]
    fn tree_item_serializes_with_type_tag() {
        let item = TreeItem::Url(
            BookmarkRecord::new("Docs", "https://docs.rs").with_date_added("13300000000000000"),
        );
        let value = serde_json::to_value(&item).expect("serialize");
        assert_eq!(value["type"], "url");
        assert_eq!(value["date_added"], "13300000000000000");

        let back: TreeItem = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, item);
    }

    #[test]
    fn roots_serialize_as_typed_folders() {
        let tree = BookmarkTree {
            checksum: json!(""),
            roots: Roots {
                bookmark_bar: FolderNode::new("Bookmarks bar"),
                other: FolderNode::new("Other bookmarks"),
                synced: FolderNode::new("Mobile bookmarks"),
            },
            version: json!(DEFAULT_VERSION),
        };
        let value = serde_json::to_value(&tree).expect("serialize");
        assert_eq!(value["roots"]["other"]["type"], "folder");
        assert_eq!(value["roots"]["synced"]["children"], json!([]));

        let back: BookmarkTree = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, tree);
    }

    #[test]
    fn timestamp_converts_from_chromium_epoch() {
        // 2021-01-01T00:00:00Z
        let ts = Timestamp::from("13253932800000000");
        assert_eq!(ts.to_unix_seconds(), Some(1_609_459_200));

        let ts = Timestamp(json!(13253932800000000_i64));
        assert_eq!(ts.to_unix_seconds(), Some(1_609_459_200));

        assert_eq!(Timestamp::from("soon").to_unix_seconds(), None);
    }
}
