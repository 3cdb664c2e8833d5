// etcd-dump/src/tree/normalize.rs
use super::TreeNode;

/// A single restorable write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatEntry {
    Key { key: String, value: String },
    Dir { key: String },
}

impl FlatEntry {
    pub fn key(&self) -> &str {
        match self {
            FlatEntry::Key { key, .. } | FlatEntry::Dir { key } => key,
        }
    }
}

/// Flattens a listing into its leaves, depth first, in the order the
/// listing yields children.
///
/// Directories with children contribute only their leaves. A directory whose
/// child list is empty contributes nothing, so empty directories listed that
/// way do not survive a restore. The keyspace root is never emitted.
pub fn normalize(root: &TreeNode) -> Vec<FlatEntry> {
    let mut entries = Vec::new();
    collect(root, &mut entries);
    entries
}

fn collect(node: &TreeNode, out: &mut Vec<FlatEntry>) {
    match node {
        TreeNode::Key { key, value } => out.push(FlatEntry::Key {
            key: key.clone(),
            value: value.clone(),
        }),
        TreeNode::DirMarker { key } if is_root(key) => {}
        TreeNode::DirMarker { key } => out.push(FlatEntry::Dir { key: key.clone() }),
        TreeNode::Directory { children, .. } => {
            for child in children {
                collect(child, out);
            }
        }
    }
}

fn is_root(key: &str) -> bool {
    key.is_empty() || key == "/"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::BackupDocument;
    use serde_json::json;

    fn key(k: &str, v: &str) -> FlatEntry {
        FlatEntry::Key { key: k.into(), value: v.into() }
    }

    fn parse(value: serde_json::Value) -> TreeNode {
        serde_json::from_value::<BackupDocument>(value)
            .expect("fixture should parse")
            .into_root()
    }

    #[test]
    fn test_nested_tree_flattens_to_leaves() {
        let root = parse(json!({
            "node": {
                "key": "/",
                "dir": true,
                "nodes": [
                    {"key": "/a", "value": "1"},
                    {"key": "/b", "dir": true, "nodes": [{"key": "/b/c", "value": "2"}]}
                ]
            }
        }));

        assert_eq!(normalize(&root), vec![key("/a", "1"), key("/b/c", "2")]);
    }

    #[test]
    fn test_depth_first_preserves_source_order() {
        let root = parse(json!({
            "dir": true,
            "nodes": [
                {"key": "/z", "dir": true, "nodes": [
                    {"key": "/z/2", "value": "b"},
                    {"key": "/z/1", "value": "a"}
                ]},
                {"key": "/m", "value": "m"}
            ]
        }));

        assert_eq!(
            normalize(&root),
            vec![key("/z/2", "b"), key("/z/1", "a"), key("/m", "m")]
        );
    }

    #[test]
    fn test_empty_children_directory_is_dropped() {
        let root = parse(json!({
            "node": {"dir": true, "nodes": [
                {"key": "/gone", "dir": true, "nodes": []},
                {"key": "/kept", "value": "v"}
            ]}
        }));

        assert_eq!(normalize(&root), vec![key("/kept", "v")]);
    }

    #[test]
    fn test_directory_marker_is_emitted() {
        let root = parse(json!({
            "node": {"dir": true, "nodes": [{"key": "/queue", "dir": true}]}
        }));

        assert_eq!(normalize(&root), vec![FlatEntry::Dir { key: "/queue".into() }]);
    }

    #[test]
    fn test_empty_store_yields_nothing() {
        let root = parse(json!({"action": "get", "node": {"dir": true}}));
        assert!(normalize(&root).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent_on_flat_output() {
        let root = parse(json!({
            "node": {"dir": true, "nodes": [
                {"key": "/a", "dir": true, "nodes": [
                    {"key": "/a/b", "value": "1"},
                    {"key": "/a/c", "dir": true}
                ]},
                {"key": "/d", "value": "2"}
            ]}
        }));
        let flat = normalize(&root);

        let rewrapped = TreeNode::Directory {
            key: "/".into(),
            children: flat
                .iter()
                .map(|entry| match entry {
                    FlatEntry::Key { key, value } => TreeNode::Key {
                        key: key.clone(),
                        value: value.clone(),
                    },
                    FlatEntry::Dir { key } => TreeNode::DirMarker { key: key.clone() },
                })
                .collect(),
        };

        assert_eq!(normalize(&rewrapped), flat);
        assert_eq!(flat[1].key(), "/a/c");
    }
}
