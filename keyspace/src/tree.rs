//! Conversion between flat dot-separated mappings and nested trees.
//!
//! [`assemble`] is deterministic: keys are placed in a fixed total order, so the
//! resulting tree depends only on the mapping's contents. Where a key is both a
//! leaf and the parent of other keys (`a.b` and `a.b.c`), the deeper key wins.

use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::Error,
    source::json_type_name,
    types::{FlatMapping, KEY_SEPARATOR},
};

/// One node of a [`Tree`]: a translated string or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf(String),
    Branch(Tree),
}

impl TreeNode {
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            TreeNode::Leaf(value) => Some(value),
            TreeNode::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Tree> {
        match self {
            TreeNode::Leaf(_) => None,
            TreeNode::Branch(tree) => Some(tree),
        }
    }
}

/// Nested segment → node mapping. Serializes as plain nested JSON objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    children: BTreeMap<String, TreeNode>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, segment: &str) -> Option<&TreeNode> {
        self.children.get(segment)
    }

    /// Looks up a dot-separated path, e.g. `tree.get_path("a.b.c")`.
    pub fn get_path(&self, path: &str) -> Option<&TreeNode> {
        let mut segments = path.split(KEY_SEPARATOR);
        let mut node = self.children.get(segments.next()?)?;
        for segment in segments {
            node = node.as_branch()?.children.get(segment)?;
        }
        Some(node)
    }

    /// Number of leaves in the whole tree.
    pub fn leaf_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                TreeNode::Leaf(_) => 1,
                TreeNode::Branch(tree) => tree.leaf_count(),
            })
            .sum()
    }

    /// Flattens back into dot-separated keys. Inverse of [`assemble`] for
    /// mappings without parent/child conflicts.
    pub fn flatten(&self) -> FlatMapping {
        let mut out = FlatMapping::new();
        self.flatten_into(None, &mut out);
        out
    }

    fn flatten_into(&self, prefix: Option<&str>, out: &mut FlatMapping) {
        for (segment, node) in &self.children {
            let key = join_key(prefix, segment);
            match node {
                TreeNode::Leaf(value) => {
                    out.insert(key, value.clone());
                }
                TreeNode::Branch(tree) => tree.flatten_into(Some(&key), out),
            }
        }
    }

    /// Places `value` at `path`, replacing leaves that sit on the way.
    /// Returns `false` when the final position is already an interior node.
    fn place(&mut self, path: &str, value: &str) -> bool {
        let mut segments: Vec<&str> = path.split(KEY_SEPARATOR).collect();
        let Some(last) = segments.pop() else {
            return false;
        };

        let mut current = self;
        for segment in segments {
            let node = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| TreeNode::Branch(Tree::new()));
            if let TreeNode::Leaf(_) = node {
                *node = TreeNode::Branch(Tree::new());
            }
            let TreeNode::Branch(tree) = node else {
                return false;
            };
            current = tree;
        }

        match current.children.get(last) {
            Some(TreeNode::Branch(_)) => false,
            _ => {
                current
                    .children
                    .insert(last.to_string(), TreeNode::Leaf(value.to_string()));
                true
            }
        }
    }
}

/// Options for [`assemble`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Leading segment stripped from keys before placement, e.g. `cloud`
    /// turns `cloud.my_templates.title` into `my_templates.title`.
    pub root_alias: Option<String>,
}

impl AssembleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_alias(mut self, alias: Option<String>) -> Self {
        self.root_alias = alias;
        self
    }
}

/// Strips `"<alias>."` from the front of `key`. The bare key `"<alias>"` is kept.
fn strip_alias<'a>(key: &'a str, alias: Option<&str>) -> &'a str {
    alias
        .and_then(|alias| key.strip_prefix(alias))
        .and_then(|rest| rest.strip_prefix(KEY_SEPARATOR))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(key)
}

struct Placement<'a> {
    path: &'a str,
    original: &'a str,
    value: &'a str,
    depth: usize,
}

fn placement_order(a: &Placement<'_>, b: &Placement<'_>) -> Ordering {
    b.depth
        .cmp(&a.depth)
        .then_with(|| b.path.len().cmp(&a.path.len()))
        .then_with(|| a.path.cmp(b.path))
        .then_with(|| a.original.cmp(b.original))
}

fn placements<'a>(mapping: &'a FlatMapping, alias: Option<&str>) -> Vec<Placement<'a>> {
    mapping
        .iter()
        .map(|(key, value)| {
            let path = strip_alias(key, alias);
            Placement {
                path,
                original: key,
                value,
                depth: path.split(KEY_SEPARATOR).count(),
            }
        })
        .collect()
}

/// Builds a nested tree from a flat mapping.
///
/// Keys are placed deepest first (then longest, then lexically), so a parent
/// key whose position is already an interior node is discarded. When two keys
/// land on the same path after alias stripping, the lexically greater original
/// key wins.
pub fn assemble(mapping: &FlatMapping, options: &AssembleOptions) -> Tree {
    let mut placements = placements(mapping, options.root_alias.as_deref());
    placements.sort_by(placement_order);

    let mut tree = Tree::new();
    for placement in &placements {
        if !tree.place(placement.path, placement.value) {
            tracing::debug!(
                key = placement.original,
                "discarding value shadowed by nested keys"
            );
        }
    }
    tree
}

fn join_key(prefix: Option<&str>, segment: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}{}{}", prefix, KEY_SEPARATOR, segment),
        _ => segment.to_string(),
    }
}

/// Flattens a nested JSON object into dot-separated keys, optionally under `prefix`.
///
/// Only objects and strings are accepted; any other value is an
/// [`Error::InvalidValue`] naming the key it was found under.
pub fn flatten(value: &Value, prefix: Option<&str>) -> Result<FlatMapping, Error> {
    let mut out = FlatMapping::new();
    flatten_value(value, prefix, &mut out)?;
    Ok(out)
}

fn flatten_value(value: &Value, prefix: Option<&str>, out: &mut FlatMapping) -> Result<(), Error> {
    match value {
        Value::Object(map) => {
            for (segment, child) in map {
                let key = join_key(prefix, segment);
                flatten_value(child, Some(&key), out)?;
            }
            Ok(())
        }
        Value::String(text) => match prefix {
            Some(key) if !key.is_empty() => {
                out.insert(key, text.clone());
                Ok(())
            }
            _ => Err(Error::validation_error(
                "a bare string cannot be flattened without a key",
            )),
        },
        other => Err(Error::InvalidValue {
            key: prefix.unwrap_or_default().to_string(),
            origin: "nested document".to_string(),
            found: json_type_name(other).to_string(),
        }),
    }
}
