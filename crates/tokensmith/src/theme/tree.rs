//! Recursive string-or-map theme trees.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Key synthesized when a leaf has to share its path with children.
pub const DEFAULT_KEY: &str = "DEFAULT";

/// A map key inside a theme tree.
///
/// Pure-digit segments (`500`) become integer keys so palettes serialize as
/// `{ "red": { 500: ... } }` in generated code; everything else stays a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThemeKey {
    Index(u64),
    Name(String),
}

impl ThemeKey {
    /// Classifies a path segment.
    ///
    /// Only canonical integers are promoted: `050` stays a name so the
    /// round trip back to text is lossless.
    pub fn from_segment(segment: &str) -> Self {
        let canonical = !segment.is_empty()
            && segment.bytes().all(|b| b.is_ascii_digit())
            && (segment == "0" || !segment.starts_with('0'));
        if canonical {
            if let Ok(index) = segment.parse() {
                return ThemeKey::Index(index);
            }
        }
        ThemeKey::Name(segment.to_string())
    }

    pub fn default_key() -> Self {
        ThemeKey::Name(DEFAULT_KEY.to_string())
    }

    /// Returns the key name when it is not an integer.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            ThemeKey::Name(name) => Some(name),
            ThemeKey::Index(_) => None,
        }
    }
}

impl fmt::Display for ThemeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeKey::Index(index) => write!(f, "{}", index),
            ThemeKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for ThemeKey {
    fn from(segment: &str) -> Self {
        ThemeKey::from_segment(segment)
    }
}

impl Serialize for ThemeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ThemeKey::Index(index) => serializer.serialize_u64(*index),
            ThemeKey::Name(name) => serializer.serialize_str(name),
        }
    }
}

/// Converts string segments into keys.
pub fn keys_from_segments<S: AsRef<str>>(segments: &[S]) -> Vec<ThemeKey> {
    segments
        .iter()
        .map(|s| ThemeKey::from_segment(s.as_ref()))
        .collect()
}

/// A value or a nested subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ThemeNode {
    Value(String),
    Branch(ThemeTree),
}

impl ThemeNode {
    /// The node's own value: the leaf itself, or a branch's `DEFAULT`.
    pub fn value(&self) -> Option<&str> {
        match self {
            ThemeNode::Value(value) => Some(value),
            ThemeNode::Branch(tree) => match tree.get(&ThemeKey::default_key()) {
                Some(ThemeNode::Value(value)) => Some(value),
                _ => None,
            },
        }
    }
}

/// An insertion-ordered map of theme keys to nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ThemeTree {
    entries: IndexMap<ThemeKey, ThemeNode>,
}

impl ThemeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &ThemeKey) -> Option<&ThemeNode> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ThemeKey, &ThemeNode)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes `value` at `path`, creating branches as needed.
    ///
    /// A leaf in the way of a deeper write is demoted to `DEFAULT` of a new
    /// branch; a write that lands on an existing branch sets its `DEFAULT`.
    pub fn insert_path(&mut self, path: &[ThemeKey], value: String) {
        let Some((first, rest)) = path.split_first() else {
            return;
        };

        if rest.is_empty() {
            match self.entries.get_mut(first) {
                Some(ThemeNode::Branch(tree)) => {
                    tree.entries
                        .insert(ThemeKey::default_key(), ThemeNode::Value(value));
                }
                _ => {
                    self.entries.insert(first.clone(), ThemeNode::Value(value));
                }
            }
            return;
        }

        let node = self
            .entries
            .entry(first.clone())
            .or_insert_with(|| ThemeNode::Branch(ThemeTree::new()));
        if let ThemeNode::Value(leaf) = node {
            let mut demoted = ThemeTree::new();
            demoted
                .entries
                .insert(ThemeKey::default_key(), ThemeNode::Value(std::mem::take(leaf)));
            *node = ThemeNode::Branch(demoted);
        }
        if let ThemeNode::Branch(tree) = node {
            tree.insert_path(rest, value);
        }
    }

    /// Returns the node at `path`.
    pub fn get_path(&self, path: &[ThemeKey]) -> Option<&ThemeNode> {
        let (first, rest) = path.split_first()?;
        let node = self.entries.get(first)?;
        if rest.is_empty() {
            return Some(node);
        }
        match node {
            ThemeNode::Branch(tree) => tree.get_path(rest),
            ThemeNode::Value(_) => None,
        }
    }

    /// Returns the value stored at `path`, following `DEFAULT` on branches.
    pub fn value_at(&self, path: &[ThemeKey]) -> Option<&str> {
        self.get_path(path).and_then(ThemeNode::value)
    }

    /// Removes the whole node at `path`. An empty path clears the tree.
    pub fn remove_subtree(&mut self, path: &[ThemeKey]) -> bool {
        let Some((first, rest)) = path.split_first() else {
            let had_entries = !self.entries.is_empty();
            self.entries.clear();
            return had_entries;
        };
        if rest.is_empty() {
            return self.entries.shift_remove(first).is_some();
        }
        let removed = match self.entries.get_mut(first) {
            Some(ThemeNode::Branch(tree)) => tree.remove_subtree(rest),
            _ => false,
        };
        if removed {
            self.prune(first);
        }
        removed
    }

    /// Removes only the value at `path`: a leaf, or a branch's `DEFAULT`.
    pub fn remove_value(&mut self, path: &[ThemeKey]) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return false;
        };
        if rest.is_empty() && matches!(self.entries.get(first), Some(ThemeNode::Value(_))) {
            self.entries.shift_remove(first);
            return true;
        }
        let removed = match self.entries.get_mut(first) {
            Some(ThemeNode::Branch(tree)) if rest.is_empty() => {
                tree.entries.shift_remove(&ThemeKey::default_key()).is_some()
            }
            Some(ThemeNode::Branch(tree)) => tree.remove_value(rest),
            _ => false,
        };
        if removed {
            self.prune(first);
        }
        removed
    }

    /// Removes name keys under `parent` that start with `prefix`.
    ///
    /// Covers wildcard deletion in namespaces that keep keys flat, where
    /// `in-*` has to match the literal key `in-out`.
    pub fn remove_prefixed(&mut self, parent: &[ThemeKey], prefix: &str) -> bool {
        let Some((first, rest)) = parent.split_first() else {
            let before = self.entries.len();
            self.entries
                .retain(|key, _| !key.as_name().is_some_and(|name| name.starts_with(prefix)));
            return self.entries.len() != before;
        };
        let removed = match self.entries.get_mut(first) {
            Some(ThemeNode::Branch(tree)) => tree.remove_prefixed(rest, prefix),
            _ => false,
        };
        if removed {
            self.prune(first);
        }
        removed
    }

    /// Drops `key` if it is an empty branch.
    fn prune(&mut self, key: &ThemeKey) {
        if matches!(self.entries.get(key), Some(ThemeNode::Branch(tree)) if tree.is_empty()) {
            self.entries.shift_remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<ThemeKey> {
        keys_from_segments(segments)
    }

    #[test]
    fn test_integer_keys() {
        assert_eq!(ThemeKey::from_segment("500"), ThemeKey::Index(500));
        assert_eq!(ThemeKey::from_segment("0"), ThemeKey::Index(0));
        assert_eq!(ThemeKey::from_segment("050"), ThemeKey::Name("050".into()));
        assert_eq!(ThemeKey::from_segment("2xl"), ThemeKey::Name("2xl".into()));
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = ThemeTree::new();
        tree.insert_path(&path(&["red", "500"]), "#ef4444".into());
        assert_eq!(tree.value_at(&path(&["red", "500"])), Some("#ef4444"));
        assert!(tree.value_at(&path(&["red"])).is_none());
    }

    #[test]
    fn test_leaf_demoted_to_default() {
        let mut tree = ThemeTree::new();
        tree.insert_path(&path(&["red"]), "#f00".into());
        tree.insert_path(&path(&["red", "500"]), "#ef4444".into());
        assert_eq!(tree.value_at(&path(&["red", "DEFAULT"])), Some("#f00"));
        assert_eq!(tree.value_at(&path(&["red"])), Some("#f00"));
        assert_eq!(tree.value_at(&path(&["red", "500"])), Some("#ef4444"));
    }

    #[test]
    fn test_leaf_write_onto_branch_sets_default() {
        let mut tree = ThemeTree::new();
        tree.insert_path(&path(&["red", "500"]), "#ef4444".into());
        tree.insert_path(&path(&["red"]), "#f00".into());
        assert_eq!(tree.value_at(&path(&["red", "DEFAULT"])), Some("#f00"));
        assert_eq!(tree.value_at(&path(&["red", "500"])), Some("#ef4444"));
    }

    #[test]
    fn test_remove_subtree_prunes_parents() {
        let mut tree = ThemeTree::new();
        tree.insert_path(&path(&["brand", "accent", "light"]), "a".into());
        assert!(tree.remove_subtree(&path(&["brand", "accent"])));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_value_keeps_children() {
        let mut tree = ThemeTree::new();
        tree.insert_path(&path(&["red"]), "#f00".into());
        tree.insert_path(&path(&["red", "500"]), "#ef4444".into());
        assert!(tree.remove_value(&path(&["red"])));
        assert!(tree.value_at(&path(&["red"])).is_none());
        assert_eq!(tree.value_at(&path(&["red", "500"])), Some("#ef4444"));
    }

    #[test]
    fn test_remove_prefixed_flat_keys() {
        let mut tree = ThemeTree::new();
        tree.insert_path(&path(&["in-out"]), "x".into());
        tree.insert_path(&path(&["linear"]), "y".into());
        assert!(tree.remove_prefixed(&[], "in-"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_serializes_integer_keys() {
        let mut tree = ThemeTree::new();
        tree.insert_path(&path(&["red", "500"]), "#ef4444".into());
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r##"{"red":{"500":"#ef4444"}}"##);
    }
}
