// etcd-dump/src/tree/node.rs
use serde::{Deserialize, Deserializer, de};

/// One node of a recursive `GET /v2/keys/?recursive=true` listing.
///
/// The shape of the wire object decides the variant once, at parse time:
/// a `nodes` attribute makes a [`TreeNode::Directory`], a `dir` flag without
/// `nodes` makes a [`TreeNode::DirMarker`], anything else is a key. Only
/// directories may omit `key` (the root does).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireNode")]
pub enum TreeNode {
    Key { key: String, value: String },
    /// A directory listed without children, which is how etcd reports an
    /// empty directory.
    DirMarker { key: String },
    Directory { key: String, children: Vec<TreeNode> },
}

// Index fields, ttl and expiration are ignored.
#[derive(Debug, Deserialize)]
struct WireNode {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    dir: bool,
    #[serde(default)]
    nodes: Option<Vec<WireNode>>,
}

impl TryFrom<WireNode> for TreeNode {
    type Error = String;

    fn try_from(wire: WireNode) -> Result<Self, Self::Error> {
        match wire.nodes {
            Some(nodes) => Ok(TreeNode::Directory {
                key: wire.key.unwrap_or_default(),
                children: nodes
                    .into_iter()
                    .map(TreeNode::try_from)
                    .collect::<Result<_, _>>()?,
            }),
            None if wire.dir => Ok(TreeNode::DirMarker {
                key: wire.key.unwrap_or_default(),
            }),
            None => match wire.key {
                Some(key) if !key.is_empty() => Ok(TreeNode::Key {
                    key,
                    value: wire.value.unwrap_or_default(),
                }),
                _ => Err("key node without a `key` attribute".to_string()),
            },
        }
    }
}

/// Top level of a backup file.
///
/// The store wraps its root node as `{"action": "get", "node": {...}}`; a
/// bare node is accepted as well. Presence of `node` picks the form, so a
/// malformed wrapped node is reported instead of being reread as a bare one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupDocument {
    Listing { node: TreeNode },
    Node(TreeNode),
}

impl<'de> Deserialize<'de> for BackupDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        match value.get_mut("node").map(serde_json::Value::take) {
            Some(node) => serde_json::from_value(node)
                .map(|node| BackupDocument::Listing { node })
                .map_err(de::Error::custom),
            None => serde_json::from_value(value)
                .map(BackupDocument::Node)
                .map_err(de::Error::custom),
        }
    }
}

impl BackupDocument {
    pub fn into_root(self) -> TreeNode {
        match self {
            BackupDocument::Listing { node } | BackupDocument::Node(node) => node,
        }
    }
}
